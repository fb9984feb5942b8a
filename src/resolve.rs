//!
//! Classification of menu items.
//!
//! All functions are pure and work on the static configuration only.
//! Empty strings count as missing.
//!

use crate::item::MenuItem;

/// Icons with this prefix are rendered as icon glyphs.
/// All other icons are treated as images.
pub const ICON_PREFIX: &str = "fa-";

/// Class marker for dividers.
pub const DIVIDER_CLASS: &str = "divider";
/// Class marker for submenus.
pub const SUBMENU_CLASS: &str = "dropdown-submenu";

/// Structural kind of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuClass {
    /// Separator row.
    Divider,
    /// Has child items.
    SubMenu,
    /// Anything else.
    Plain,
}

fn has_title(item: &MenuItem) -> bool {
    !item.title_str().is_empty()
}

fn has_icon(item: &MenuItem) -> bool {
    !item.icon_str().is_empty()
}

/// Neither title nor icon.
pub fn is_divider(item: &MenuItem) -> bool {
    !has_title(item) && !has_icon(item)
}

/// Has at least one child item.
pub fn is_submenu(item: &MenuItem) -> bool {
    !item.items.is_empty()
}

/// Icon that is not an icon-font glyph.
pub fn is_image(item: &MenuItem) -> bool {
    has_icon(item) && !item.icon_str().starts_with(ICON_PREFIX)
}

/// Icon-font glyph.
pub fn is_icon(item: &MenuItem) -> bool {
    has_icon(item) && item.icon_str().starts_with(ICON_PREFIX)
}

/// Title is shown unless explicitly switched off.
pub fn can_show_title(item: &MenuItem) -> bool {
    item.show_title.unwrap_or(true)
}

/// Top-level button menu.
pub fn is_button(item: &MenuItem) -> bool {
    item.is_button.unwrap_or(false)
}

/// A divider with child items.
pub fn is_misconfigured(item: &MenuItem) -> bool {
    is_divider(item) && is_submenu(item)
}

/// Classify the item. Divider wins over submenu.
pub fn classify(item: &MenuItem) -> MenuClass {
    if is_divider(item) {
        MenuClass::Divider
    } else if is_submenu(item) {
        MenuClass::SubMenu
    } else {
        MenuClass::Plain
    }
}

/// Class marker for the item, if any.
pub fn css_class(item: &MenuItem) -> Option<&'static str> {
    match classify(item) {
        MenuClass::Divider => Some(DIVIDER_CLASS),
        MenuClass::SubMenu => Some(SUBMENU_CLASS),
        MenuClass::Plain => None,
    }
}
