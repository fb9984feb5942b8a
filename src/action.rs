//!
//! Binding of menu items to the action framework.
//!
//! The application provides the handler context as an
//! [ActionHandler]. Each menu node with an action asks the handler
//! once for a [BoundAction] when the node is instantiated, and
//! calls [BoundAction::on_click] for every click later on.
//!
//! The record of the surrounding form is available as a
//! [RecordWatch]. The menu only forwards the current value to
//! the bound actions.
//!
use std::borrow::Cow;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Record value of the surrounding form.
pub type Record = serde_json::Value;

/// Opaque action identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionRef(Cow<'static, str>);

impl ActionRef {
    pub fn new(action: impl Into<Cow<'static, str>>) -> Self {
        Self(action.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl Display for ActionRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_ref())
    }
}

impl From<&'static str> for ActionRef {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for ActionRef {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// The node an action is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindTarget {
    /// Path of the node in the menu tree.
    pub path: Vec<usize>,
    /// Title of the menu item.
    pub title: Option<String>,
}

/// Handler context.
///
/// Resolves action references into callable handlers.
/// Shared read-only by all nodes of one menubar.
pub trait ActionHandler: Debug {
    /// Bind the action for the given target.
    fn handler(&self, target: &BindTarget, action: &ActionRef) -> Box<dyn BoundAction>;
}

/// Bound click handler.
pub trait BoundAction: Debug {
    /// Run the action.
    ///
    /// Errors are not handled by the menu, they are given
    /// back to the caller of the event-handler.
    fn on_click(&self, record: Option<&Record>) -> Result<(), ActionError>;
}

/// Error of a bound action.
pub type ActionError = Box<dyn Error + Send + Sync>;

/// Callback type for [FnHandler].
pub type ActionFn = Rc<dyn Fn(&ActionRef, Option<&Record>) -> Result<(), ActionError>>;

/// Handler context from a closure.
///
/// All actions run through the same function,
/// which gets the action reference as parameter.
#[derive(Clone)]
pub struct FnHandler {
    f: ActionFn,
}

impl Debug for FnHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

impl FnHandler {
    pub fn new(
        f: impl Fn(&ActionRef, Option<&Record>) -> Result<(), ActionError> + 'static,
    ) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Shared handler context.
    pub fn shared(
        f: impl Fn(&ActionRef, Option<&Record>) -> Result<(), ActionError> + 'static,
    ) -> Rc<dyn ActionHandler> {
        Rc::new(Self::new(f))
    }
}

impl ActionHandler for FnHandler {
    fn handler(&self, target: &BindTarget, action: &ActionRef) -> Box<dyn BoundAction> {
        Box::new(FnBinding {
            path: target.path.clone(),
            action: action.clone(),
            f: self.f.clone(),
        })
    }
}

struct FnBinding {
    path: Vec<usize>,
    action: ActionRef,
    f: ActionFn,
}

impl Debug for FnBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnBinding")
            .field("path", &self.path)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl BoundAction for FnBinding {
    fn on_click(&self, record: Option<&Record>) -> Result<(), ActionError> {
        (self.f)(&self.action, record)
    }
}

/// Record of the surrounding form.
///
/// Cloning gives another handle to the same value.
/// The owner of the form sets the value, the menu only reads it.
#[derive(Debug, Clone, Default)]
pub struct RecordWatch {
    inner: Rc<RefCell<RecordCell>>,
}

#[derive(Debug, Default)]
struct RecordCell {
    value: Option<Record>,
    version: u64,
}

impl RecordWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// With an initial value.
    pub fn with(record: Record) -> Self {
        let w = Self::default();
        w.set(Some(record));
        w
    }

    /// Change the record.
    pub fn set(&self, record: Option<Record>) {
        let mut cell = self.inner.borrow_mut();
        cell.value = record;
        cell.version = cell.version.wrapping_add(1);
    }

    /// Current record.
    pub fn get(&self) -> Option<Record> {
        self.inner.borrow().value.clone()
    }

    /// Incremented with every change.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Both handles watch the same record.
    pub fn same(&self, other: &RecordWatch) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
