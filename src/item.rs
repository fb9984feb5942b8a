//!
//! Menu configuration.
//!
//! A [MenuItem] describes one entry of the menu tree. It is
//! owned by the application and never modified by the menubar.
//! Submenus are nested via [MenuItem::items].
//!
//! ```
//! use rat_menutree::{ActionRef, MenuItem};
//!
//! let file = MenuItem::new()
//!     .title("File")
//!     .item(MenuItem::new().title("Open").action("open.action"))
//!     .item(MenuItem::divider())
//!     .item(MenuItem::new().title("Exit").click(|_| {}));
//!
//! assert_eq!(file.items.len(), 3);
//! assert_eq!(file.items[0].action, Some(ActionRef::from("open.action")));
//! ```
use crate::action::ActionRef;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Click callback.
pub type ClickFn = Rc<dyn Fn(&MenuClick)>;

/// Dynamic active predicate.
pub type ActiveFn = Rc<dyn Fn() -> bool>;

/// Click event as given to the click callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuClick {
    /// Path of the clicked node. Index into the top-level
    /// menus followed by the indexes into the submenus.
    pub path: Vec<usize>,
    /// Screen position for mouse clicks.
    pub pos: Option<(u16, u16)>,
}

impl MenuClick {
    /// Click via the keyboard.
    pub fn key(path: &[usize]) -> Self {
        Self {
            path: path.to_vec(),
            pos: None,
        }
    }

    /// Click via the mouse.
    pub fn mouse(path: &[usize], pos: (u16, u16)) -> Self {
        Self {
            path: path.to_vec(),
            pos: Some(pos),
        }
    }
}

/// A menu item.
#[derive(Clone, Default)]
pub struct MenuItem {
    /// Title text.
    pub title: Option<String>,
    /// Icon. Names starting with [ICON_PREFIX](crate::resolve::ICON_PREFIX)
    /// are icon glyphs, everything else is an image.
    pub icon: Option<String>,
    /// Submenu.
    pub items: Vec<Rc<MenuItem>>,
    /// Action that is dispatched via the handler context.
    pub action: Option<ActionRef>,
    /// Direct callback, if there is no action.
    pub click: Option<ClickFn>,
    /// Readonly if this returns false.
    pub active: Option<ActiveFn>,
    /// Show the title. Defaults to true.
    pub show_title: Option<bool>,
    /// Render a top-level menu as button.
    pub is_button: Option<bool>,
}

impl Debug for MenuItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("title", &self.title)
            .field("icon", &self.icon)
            .field("items", &self.items)
            .field("action", &self.action)
            .field("click", &self.click.is_some())
            .field("active", &self.active.is_some())
            .field("show_title", &self.show_title)
            .field("is_button", &self.is_button)
            .finish()
    }
}

impl MenuItem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Divider row.
    pub fn divider() -> Self {
        Self::default()
    }

    /// Title text.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Icon or image.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Add a submenu item.
    pub fn item(mut self, item: MenuItem) -> Self {
        self.items.push(Rc::new(item));
        self
    }

    /// Add an already shared submenu item.
    pub fn item_rc(mut self, item: Rc<MenuItem>) -> Self {
        self.items.push(item);
        self
    }

    /// Add submenu items.
    pub fn items(mut self, items: impl IntoIterator<Item = MenuItem>) -> Self {
        self.items.extend(items.into_iter().map(Rc::new));
        self
    }

    /// Action reference.
    pub fn action(mut self, action: impl Into<ActionRef>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Click callback.
    pub fn click(mut self, click: impl Fn(&MenuClick) + 'static) -> Self {
        self.click = Some(Rc::new(click));
        self
    }

    /// Active predicate.
    pub fn active(mut self, active: impl Fn() -> bool + 'static) -> Self {
        self.active = Some(Rc::new(active));
        self
    }

    /// Show/hide the title.
    pub fn show_title(mut self, show: bool) -> Self {
        self.show_title = Some(show);
        self
    }

    /// Render as button.
    pub fn button(mut self, button: bool) -> Self {
        self.is_button = Some(button);
        self
    }

    /// Title or the empty string.
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Icon or the empty string.
    pub fn icon_str(&self) -> &str {
        self.icon.as_deref().unwrap_or_default()
    }
}

/// Create the shared top-level list.
pub fn menu_tree(menus: impl IntoIterator<Item = MenuItem>) -> Vec<Rc<MenuItem>> {
    menus.into_iter().map(Rc::new).collect()
}
