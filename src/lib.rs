#![doc = include_str!("../readme.md")]
#![allow(clippy::collapsible_else_if)]

use crate::_private::NonExhaustive;
use ratatui::style::Style;
use ratatui::widgets::Block;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod action;
pub mod dropdown;
pub mod item;
pub mod menubar;
pub mod node;
pub mod resolve;
mod util;

pub use crate::action::{
    ActionError, ActionHandler, ActionRef, BindTarget, BoundAction, FnHandler, Record, RecordWatch,
};
pub use crate::item::{MenuClick, MenuItem};
pub use crate::menubar::{MenuBar, MenuBarState};
pub use crate::node::{MenuNode, NodeAttr};

pub mod event {
    //!
    //! Event-handler traits and outcomes.
    //!
    pub use rat_event::*;

    /// What a click on a menu node did.
    ///
    /// At most one of these happens per click.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum Dispatch {
        /// Hidden, readonly or divider row. Nothing happened.
        Inert,
        /// Submenu header. Only the dropdown was toggled.
        SubMenu,
        /// The bound action was invoked.
        Action,
        /// The click callback was invoked.
        Click,
        /// Leaf without action and callback.
        Noop,
    }

    /// Outcome for the menubar.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    pub enum MenuOutcome {
        /// The given event was not handled at all.
        Continue,
        /// The event was handled, no repaint necessary.
        Unchanged,
        /// The event was handled, repaint necessary.
        Changed,
        /// A top-level menu was selected.
        Selected(usize),
        /// A menu node was clicked/activated.
        Activated(Dispatch),
    }

    impl ConsumedEvent for MenuOutcome {
        fn is_consumed(&self) -> bool {
            *self != MenuOutcome::Continue
        }
    }

    impl From<MenuOutcome> for Outcome {
        fn from(value: MenuOutcome) -> Self {
            match value {
                MenuOutcome::Continue => Outcome::Continue,
                MenuOutcome::Unchanged => Outcome::Unchanged,
                MenuOutcome::Changed => Outcome::Changed,
                MenuOutcome::Selected(_) => Outcome::Changed,
                MenuOutcome::Activated(_) => Outcome::Changed,
            }
        }
    }

    impl From<Outcome> for MenuOutcome {
        fn from(value: Outcome) -> Self {
            match value {
                Outcome::Continue => MenuOutcome::Continue,
                Outcome::Unchanged => MenuOutcome::Unchanged,
                Outcome::Changed => MenuOutcome::Changed,
            }
        }
    }

    impl From<bool> for MenuOutcome {
        fn from(value: bool) -> Self {
            if value {
                MenuOutcome::Changed
            } else {
                MenuOutcome::Unchanged
            }
        }
    }
}

/// Errors of the menu core.
#[derive(Debug)]
pub enum MenuError {
    /// The bound action failed.
    ///
    /// Contains the action reference and the error of the
    /// action framework.
    Action {
        action: ActionRef,
        source: ActionError,
    },
    /// The node is a divider and a submenu at the same time.
    ///
    /// Contains the path of the node.
    Misconfigured(Vec<usize>),
    /// There is no node at the given path.
    NoSuchNode(Vec<usize>),
}

impl Display for MenuError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuError::Action { action, source } => {
                write!(f, "action {} failed: {}", action, source)
            }
            MenuError::Misconfigured(path) => {
                write!(f, "menu item {:?} has sub-items but neither title nor icon", path)
            }
            MenuError::NoSuchNode(path) => {
                write!(f, "no menu item at {:?}", path)
            }
        }
    }
}

impl Error for MenuError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MenuError::Action { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Combined styles.
#[derive(Debug, Clone)]
pub struct MenuStyle {
    /// Base style.
    pub style: Style,
    /// Style for the selected item.
    pub focus: Option<Style>,
    /// Style for a readonly item.
    pub disabled: Option<Style>,
    /// Style for top-level button menus.
    pub button: Option<Style>,
    /// Style for icon/image markers.
    pub icon: Option<Style>,
    /// Style for dividers.
    pub divider: Option<Style>,

    /// Styling for the dropdowns.
    pub popup_style: Option<Style>,
    /// Block for the dropdowns.
    pub popup_block: Option<Block<'static>>,

    pub non_exhaustive: NonExhaustive,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            style: Default::default(),
            focus: Default::default(),
            disabled: Default::default(),
            button: Default::default(),
            icon: Default::default(),
            divider: Default::default(),
            popup_style: Default::default(),
            popup_block: Default::default(),
            non_exhaustive: NonExhaustive,
        }
    }
}

mod _private {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct NonExhaustive;
}
