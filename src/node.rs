//!
//! Runtime nodes of the menu tree.
//!
//! A [MenuNode] is created for each [MenuItem] when the menubar
//! state is constructed. It holds the classification of the item,
//! the runtime attributes `hidden` and `readonly`, and the bound
//! action. Child nodes are created recursively with the same
//! [NodeContext].
//!
use crate::action::{ActionHandler, BindTarget, BoundAction, Record, RecordWatch};
use crate::dropdown::DropdownToggle;
use crate::event::Dispatch;
use crate::item::{MenuClick, MenuItem};
use crate::resolve::{self, MenuClass};
use crate::MenuError;
use log::{debug, warn};
use std::rc::Rc;
use std::str::FromStr;

/// Context that is passed down the menu tree unchanged.
#[derive(Debug, Clone, Default)]
pub struct NodeContext {
    /// Handler context for binding actions.
    pub handler: Option<Rc<dyn ActionHandler>>,
    /// Record of the surrounding form.
    pub record: Option<RecordWatch>,
}

/// Runtime attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeAttr {
    Hidden,
    Readonly,
}

impl FromStr for NodeAttr {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hidden" => Ok(NodeAttr::Hidden),
            "readonly" => Ok(NodeAttr::Readonly),
            _ => Err(()),
        }
    }
}

/// Runtime state of one node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeAttrs {
    pub hidden: bool,
    pub readonly: bool,
}

/// Instantiated menu item.
#[derive(Debug)]
pub struct MenuNode {
    item: Rc<MenuItem>,
    path: Vec<usize>,
    class: MenuClass,
    misconfigured: bool,
    attrs: NodeAttrs,
    binding: Option<Box<dyn BoundAction>>,
    record: Option<RecordWatch>,
    children: Vec<MenuNode>,
}

impl MenuNode {
    /// Instantiate the node and all its children.
    pub fn new(item: Rc<MenuItem>, path: Vec<usize>, ctx: &NodeContext) -> Self {
        let class = resolve::classify(&item);
        let misconfigured = resolve::is_misconfigured(&item);
        if misconfigured {
            warn!(
                "menu item {:?} has {} sub-items but neither title nor icon",
                path,
                item.items.len()
            );
        }

        let binding = match (&item.action, &ctx.handler) {
            (Some(action), Some(handler)) => {
                let target = BindTarget {
                    path: path.clone(),
                    title: item.title.clone(),
                };
                Some(handler.handler(&target, action))
            }
            (Some(action), None) => {
                warn!(
                    "menu item {:?} has action {} but there is no handler",
                    path, action
                );
                None
            }
            (None, _) => None,
        };

        let children = if class == MenuClass::SubMenu {
            item.items
                .iter()
                .enumerate()
                .map(|(n, child)| {
                    let mut child_path = path.clone();
                    child_path.push(n);
                    MenuNode::new(child.clone(), child_path, ctx)
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            item,
            path,
            class,
            misconfigured,
            attrs: Default::default(),
            binding,
            record: ctx.record.clone(),
            children,
        }
    }

    /// Menu configuration.
    pub fn item(&self) -> &MenuItem {
        &self.item
    }

    /// Path in the menu tree.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Nesting level. 0 for the top-level menus.
    pub fn level(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Child nodes.
    pub fn children(&self) -> &[MenuNode] {
        &self.children
    }

    /// Child nodes.
    pub fn children_mut(&mut self) -> &mut [MenuNode] {
        &mut self.children
    }

    pub fn class(&self) -> MenuClass {
        self.class
    }

    pub fn is_divider(&self) -> bool {
        self.class == MenuClass::Divider
    }

    pub fn is_submenu(&self) -> bool {
        self.class == MenuClass::SubMenu
    }

    /// Divider with sub-items.
    pub fn is_misconfigured(&self) -> bool {
        self.misconfigured
    }

    /// Explicit attribute first, then the active predicate.
    pub fn is_readonly(&self) -> bool {
        if self.attrs.readonly {
            true
        } else if let Some(active) = &self.item.active {
            !active()
        } else {
            false
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.attrs.hidden
    }

    /// Not clickable.
    pub fn is_inert(&self) -> bool {
        self.is_hidden() || self.is_divider() || self.is_readonly()
    }

    /// Has a bound action.
    ///
    /// Submenus and dividers are bound too, but their
    /// action never runs.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Class marker.
    pub fn css_class(&self) -> Option<&'static str> {
        match self.class {
            MenuClass::Divider => Some(resolve::DIVIDER_CLASS),
            MenuClass::SubMenu => Some(resolve::SUBMENU_CLASS),
            MenuClass::Plain => None,
        }
    }

    /// Runtime attributes.
    pub fn attrs(&self) -> NodeAttrs {
        self.attrs
    }

    /// Set a runtime attribute.
    pub fn attr(&mut self, attr: NodeAttr, value: bool) {
        match attr {
            NodeAttr::Hidden => self.attrs.hidden = value,
            NodeAttr::Readonly => self.attrs.readonly = value,
        }
    }

    /// Set a runtime attribute by name.
    ///
    /// Unknown names are ignored.
    pub fn attr_str(&mut self, name: &str, value: bool) {
        match name.parse::<NodeAttr>() {
            Ok(attr) => self.attr(attr, value),
            Err(_) => debug!("menu item {:?} ignores attr {}", self.path, name),
        }
    }

    /// Current record of the surrounding form.
    pub fn record(&self) -> Option<Record> {
        self.record.as_ref().and_then(|v| v.get())
    }

    /// Node at the path relative to this one.
    pub fn find(&self, path: &[usize]) -> Option<&MenuNode> {
        match path.split_first() {
            None => Some(self),
            Some((n, rest)) => self.children.get(*n)?.find(rest),
        }
    }

    /// Node at the path relative to this one.
    pub fn find_mut(&mut self, path: &[usize]) -> Option<&mut MenuNode> {
        match path.split_first() {
            None => Some(self),
            Some((n, rest)) => self.children.get_mut(*n)?.find_mut(rest),
        }
    }

    /// Handle a click on this node.
    ///
    /// * Inert rows do nothing.
    /// * Submenu headers toggle their dropdown.
    /// * Leaves collapse the dropdown chain and then run either
    ///   the action, or the click callback, or nothing.
    ///
    /// If the action fails the dropdown chain is restored.
    pub fn click(
        &self,
        event: &MenuClick,
        toggle: &mut dyn DropdownToggle,
    ) -> Result<Dispatch, MenuError> {
        if self.is_inert() {
            debug!("menu click {:?} inert", self.path);
            return Ok(Dispatch::Inert);
        }
        if self.is_submenu() {
            toggle.toggle(&self.path);
            return Ok(Dispatch::SubMenu);
        }

        let before = toggle.open_path();
        toggle.collapse();

        if let Some(action) = &self.item.action {
            let Some(binding) = &self.binding else {
                debug!("menu click {:?} unbound action {}", self.path, action);
                return Ok(Dispatch::Noop);
            };
            debug!("menu click {:?} action {}", self.path, action);
            let record = self.record();
            match binding.on_click(record.as_ref()) {
                Ok(()) => Ok(Dispatch::Action),
                Err(e) => {
                    toggle.restore(&before);
                    Err(MenuError::Action {
                        action: action.clone(),
                        source: e,
                    })
                }
            }
        } else if let Some(click) = &self.item.click {
            debug!("menu click {:?} callback", self.path);
            click(event);
            Ok(Dispatch::Click)
        } else {
            Ok(Dispatch::Noop)
        }
    }

    /// Collect configuration errors of this node and all children.
    pub fn validate(&self, err: &mut Vec<MenuError>) {
        if self.misconfigured {
            err.push(MenuError::Misconfigured(self.path.clone()));
        }
        for child in &self.children {
            child.validate(err);
        }
    }
}
