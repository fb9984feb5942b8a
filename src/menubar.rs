//! Menubar with arbitrarily nested dropdown menus.
//!
//! It is not rendered as one widget necessarily, it can be
//! [split into](MenuBar::into_widgets) a [MenuBarLine] and a
//! [MenuBarPopup] widget. The MenuBarLine can be rendered in its
//! designated area anytime. The MenuBarPopup must be rendered at the
//! end of rendering, for it to be able to render above the other widgets.
//!
//! The menu structure is a tree of [MenuItem]s. The [MenuBarState]
//! instantiates one [MenuNode] per item and binds the actions via
//! the [ActionHandler] given to it. All nodes share the same handler.
//!
//! Event handling for the dropdowns must happen before handling
//! events for the widgets that might be rendered in the background.
//! Use the [Popup] qualifier for this, or use [Regular] which
//! handles everything in the correct order.
//!
//! ```
//! use rat_menutree::item::{menu_tree, MenuItem};
//! use rat_menutree::menubar::{MenuBar, MenuBarState};
//! use rat_menutree::FnHandler;
//! use ratatui::buffer::Buffer;
//! use ratatui::layout::Rect;
//! use ratatui::widgets::StatefulWidget;
//!
//! let menus = menu_tree([
//!     MenuItem::new()
//!         .title("File")
//!         .item(MenuItem::new().title("Open").action("open.action"))
//!         .item(MenuItem::divider())
//!         .item(MenuItem::new().title("Exit").click(|_| {})),
//!     MenuItem::new().title("Help"),
//! ]);
//! let handler = FnHandler::shared(|_action, _record| Ok(()));
//! let mut state = MenuBarState::new(menus, Some(handler));
//!
//! let mut buf = Buffer::empty(Rect::new(0, 0, 40, 10));
//! MenuBar::new().render(Rect::new(0, 0, 40, 1), &mut buf, &mut state);
//! ```
use crate::_private::NonExhaustive;
use crate::action::{ActionHandler, RecordWatch};
use crate::dropdown::{DropdownChain, DropdownToggle};
use crate::event::{Dispatch, MenuOutcome};
use crate::item::{MenuClick, MenuItem};
use crate::node::{MenuNode, NodeContext};
use crate::resolve;
use crate::util::{block_padding, fill_buf_area, fit_in, item_at, revert_style};
use crate::{MenuError, MenuStyle};
use log::debug;
use rat_event::{ct_event, ConsumedEvent, HandleEvent, MouseOnly, Popup, Regular};
use rat_focus::{FocusBuilder, FocusFlag, HasFocus, Navigation};
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
#[cfg(feature = "unstable-widget-ref")]
use ratatui::widgets::StatefulWidgetRef;
use ratatui::widgets::{Block, StatefulWidget, Widget};
use std::rc::Rc;
use unicode_width::UnicodeWidthStr;

/// Marker for icon-font icons.
pub const ICON_MARKER: &str = "\u{25C6}";
/// Marker for images.
pub const IMAGE_MARKER: &str = "\u{25A3}";
/// Appended to top-level menus with a dropdown.
pub const CARET: &str = " \u{25BE}";
/// Marks a submenu in a dropdown.
pub const SUBMENU_ARROW: &str = "\u{25B8}";
/// Divider line.
pub const DIVIDER_SYMBOL: &str = "\u{2500}";

/// Result type for the event-handlers.
pub type MenuResult = Result<MenuOutcome, MenuError>;

/// Menubar widget.
///
/// This handles the configuration only, to get the widgets for rendering
/// call [MenuBar::into_widgets] and use both results for rendering.
#[derive(Debug, Clone)]
pub struct MenuBar<'a> {
    style: Style,
    focus_style: Option<Style>,
    disabled_style: Option<Style>,
    button_style: Option<Style>,
    icon_style: Option<Style>,
    divider_style: Option<Style>,
    block: Option<Block<'a>>,

    popup_style: Option<Style>,
    popup_block: Option<Block<'a>>,
    popup_width: Option<u16>,
}

/// Menubar line widget.
///
/// This will render the main menu bar.
#[derive(Debug, Clone)]
pub struct MenuBarLine<'a> {
    style: Style,
    focus_style: Option<Style>,
    disabled_style: Option<Style>,
    button_style: Option<Style>,
    icon_style: Option<Style>,
    block: Option<Block<'a>>,
}

/// Menubar popup widget.
///
/// Renders the chain of open dropdowns.
#[derive(Debug, Clone)]
pub struct MenuBarPopup<'a> {
    style: Style,
    focus_style: Option<Style>,
    disabled_style: Option<Style>,
    divider_style: Option<Style>,
    block: Option<Block<'a>>,
    width: Option<u16>,
}

/// Rendered dropdown.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DropdownArea {
    /// Path of the submenu.
    pub path: Vec<usize>,
    /// Total area.
    pub area: Rect,
    /// Area per child item. Hidden items have an empty area.
    pub item_areas: Vec<Rect>,
}

/// State & event-handling.
#[derive(Debug)]
pub struct MenuBarState {
    /// Area for the main-menubar.
    /// __readonly__. renewed for each render.
    pub area: Rect,
    /// Areas of the top-level menus. Hidden menus have an empty area.
    /// __readonly__. renewed for each render.
    pub item_areas: Vec<Rect>,
    /// Open dropdowns, outermost first.
    /// __readonly__. renewed for each render.
    pub dropdowns: Vec<DropdownArea>,
    /// Selected top-level menu.
    /// __read+write__
    pub selected: Option<usize>,
    /// Highlighted item in the innermost open dropdown.
    /// __read+write__
    pub hot: Option<usize>,
    /// Current focus state.
    /// __read+write__
    pub focus: FocusFlag,

    nodes: Vec<MenuNode>,
    ctx: NodeContext,
    chain: Box<dyn DropdownToggle>,
    /// Dropdowns are registered with the first click.
    wired: bool,

    pub non_exhaustive: NonExhaustive,
}

impl Default for MenuBar<'_> {
    fn default() -> Self {
        Self {
            style: Default::default(),
            focus_style: Default::default(),
            disabled_style: Default::default(),
            button_style: Default::default(),
            icon_style: Default::default(),
            divider_style: Default::default(),
            block: Default::default(),
            popup_style: Default::default(),
            popup_block: Some(Block::bordered()),
            popup_width: Default::default(),
        }
    }
}

impl<'a> MenuBar<'a> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Base style.
    #[inline]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Block.
    #[inline]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Selection + Focus
    #[inline]
    pub fn focus_style(mut self, style: Style) -> Self {
        self.focus_style = Some(style);
        self
    }

    /// Readonly items.
    #[inline]
    pub fn disabled_style(mut self, style: Style) -> Self {
        self.disabled_style = Some(style);
        self
    }

    /// Top-level button menus.
    #[inline]
    pub fn button_style(mut self, style: Style) -> Self {
        self.button_style = Some(style);
        self
    }

    /// Icon/image markers.
    #[inline]
    pub fn icon_style(mut self, style: Style) -> Self {
        self.icon_style = Some(style);
        self
    }

    /// Divider lines.
    #[inline]
    pub fn divider_style(mut self, style: Style) -> Self {
        self.divider_style = Some(style);
        self
    }

    /// Base style for the dropdowns.
    #[inline]
    pub fn popup_style(mut self, style: Style) -> Self {
        self.popup_style = Some(style);
        self
    }

    /// Block for the dropdowns.
    #[inline]
    pub fn popup_block(mut self, block: Block<'a>) -> Self {
        self.popup_block = Some(block);
        self
    }

    /// Dropdowns without block.
    #[inline]
    pub fn popup_no_block(mut self) -> Self {
        self.popup_block = None;
        self
    }

    /// Fixed width for the dropdowns.
    /// If not set it uses the longest item.
    #[inline]
    pub fn popup_width(mut self, width: u16) -> Self {
        self.popup_width = Some(width);
        self
    }

    /// Combined style.
    #[inline]
    pub fn styles(mut self, styles: MenuStyle) -> Self {
        self.style = styles.style;
        if styles.focus.is_some() {
            self.focus_style = styles.focus;
        }
        if styles.disabled.is_some() {
            self.disabled_style = styles.disabled;
        }
        if styles.button.is_some() {
            self.button_style = styles.button;
        }
        if styles.icon.is_some() {
            self.icon_style = styles.icon;
        }
        if styles.divider.is_some() {
            self.divider_style = styles.divider;
        }
        if styles.popup_style.is_some() {
            self.popup_style = styles.popup_style;
        }
        if styles.popup_block.is_some() {
            self.popup_block = styles.popup_block;
        }
        self
    }

    /// Create the widgets for the menubar. This returns a widget
    /// for the menu-line and for the dropdowns.
    ///
    /// The dropdowns should be rendered after all widgets
    /// that might be below them have been rendered.
    #[inline]
    pub fn into_widgets(self) -> (MenuBarLine<'a>, MenuBarPopup<'a>) {
        (
            MenuBarLine {
                style: self.style,
                focus_style: self.focus_style,
                disabled_style: self.disabled_style,
                button_style: self.button_style,
                icon_style: self.icon_style,
                block: self.block,
            },
            MenuBarPopup {
                style: self.popup_style.unwrap_or(self.style),
                focus_style: self.focus_style,
                disabled_style: self.disabled_style,
                divider_style: self.divider_style,
                block: self.popup_block,
                width: self.popup_width,
            },
        )
    }
}

impl StatefulWidget for MenuBar<'_> {
    type State = MenuBarState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let (menu, popup) = self.into_widgets();
        menu.render(area, buf, state);
        popup.render(Rect::default(), buf, state);
    }
}

#[cfg(feature = "unstable-widget-ref")]
impl StatefulWidgetRef for MenuBarLine<'_> {
    type State = MenuBarState;

    fn render_ref(&self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_bar(self, area, buf, state);
    }
}

impl StatefulWidget for &MenuBarLine<'_> {
    type State = MenuBarState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_bar(self, area, buf, state);
    }
}

impl StatefulWidget for MenuBarLine<'_> {
    type State = MenuBarState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_bar(&self, area, buf, state);
    }
}

/// Label of a top-level menu.
fn bar_label<'a>(node: &'a MenuNode, icon_style: Style) -> Line<'a> {
    let item = node.item();
    let button = resolve::is_button(item);

    let mut spans = Vec::new();
    if button {
        spans.push(Span::from("["));
    }
    let marker = if resolve::is_icon(item) {
        Some(ICON_MARKER)
    } else if resolve::is_image(item) {
        Some(IMAGE_MARKER)
    } else {
        None
    };
    if let Some(marker) = marker {
        spans.push(Span::styled(marker, icon_style));
    }
    if resolve::can_show_title(item) && !item.title_str().is_empty() {
        if marker.is_some() {
            spans.push(Span::from(" "));
        }
        spans.push(Span::from(item.title_str()));
    }
    if node.is_submenu() {
        spans.push(Span::from(CARET));
    }
    if button {
        spans.push(Span::from("]"));
    }
    Line::from(spans)
}

fn render_bar(widget: &MenuBarLine<'_>, area: Rect, buf: &mut Buffer, state: &mut MenuBarState) {
    state.area = area;
    state.item_areas.clear();

    let inner = if let Some(block) = &widget.block {
        block.inner(area)
    } else {
        area
    };

    buf.set_style(area, widget.style);
    if let Some(block) = &widget.block {
        block.clone().render(area, buf);
    }

    let active = state.focus.get() || state.popup_active();
    let focus_style = widget.focus_style.unwrap_or(revert_style(widget.style));
    let disabled_style = widget.style.patch(widget.disabled_style.unwrap_or_default());
    let button_style = widget.style.patch(widget.button_style.unwrap_or_default());
    let icon_style = widget.icon_style.unwrap_or_default();

    let mut x = inner.x;
    for (n, node) in state.nodes.iter().enumerate() {
        if node.is_hidden() || inner.height == 0 {
            state.item_areas.push(Rect::default());
            continue;
        }

        let line = bar_label(node, icon_style);
        let width = line.width() as u16;
        let item_area = Rect::new(x, inner.y, width, 1).intersection(inner);

        let style = if active && state.selected == Some(n) {
            focus_style
        } else if node.is_readonly() {
            disabled_style
        } else if resolve::is_button(node.item()) {
            button_style
        } else {
            widget.style
        };
        line.style(style).render(item_area, buf);

        state.item_areas.push(item_area);
        x = x.saturating_add(width).saturating_add(1);
    }
}

#[cfg(feature = "unstable-widget-ref")]
impl StatefulWidgetRef for MenuBarPopup<'_> {
    type State = MenuBarState;

    fn render_ref(&self, _area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_popup(self, buf, state);
    }
}

impl StatefulWidget for &MenuBarPopup<'_> {
    type State = MenuBarState;

    fn render(self, _area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_popup(self, buf, state);
    }
}

impl StatefulWidget for MenuBarPopup<'_> {
    type State = MenuBarState;

    fn render(self, _area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        render_popup(&self, buf, state);
    }
}

fn render_popup(widget: &MenuBarPopup<'_>, buf: &mut Buffer, state: &mut MenuBarState) {
    state.dropdowns.clear();

    let open = state.chain.open_path();
    let Some(first) = open.first().copied() else {
        return;
    };
    let Some(node) = state.nodes.get(first) else {
        return;
    };
    if node.is_hidden() {
        return;
    }
    let anchor = state.item_areas.get(first).copied().unwrap_or_default();

    render_dropdown(
        widget,
        node,
        anchor,
        true,
        &open,
        state.hot,
        buf,
        &mut state.dropdowns,
    );
}

/// Width of a dropdown row without the block.
fn dropdown_label_width(node: &MenuNode) -> u16 {
    let arrow = if node.is_submenu() { 2 } else { 0 };
    node.item().title_str().width() as u16 + arrow
}

/// Render the dropdown for the submenu node, and recursively
/// the dropdown of its open child.
///
/// The top-level dropdown is placed below its anchor, all
/// others to the right.
#[allow(clippy::too_many_arguments)]
fn render_dropdown(
    widget: &MenuBarPopup<'_>,
    node: &MenuNode,
    anchor: Rect,
    below: bool,
    open: &[usize],
    hot: Option<usize>,
    buf: &mut Buffer,
    dropdowns: &mut Vec<DropdownArea>,
) {
    let padding = block_padding(&widget.block);
    let visible = node.children().iter().filter(|v| !v.is_hidden()).count() as u16;
    let label_width = node
        .children()
        .iter()
        .filter(|v| !v.is_hidden())
        .map(dropdown_label_width)
        .max()
        .unwrap_or_default();
    let width = widget.width.unwrap_or(label_width + 2) + padding.left + padding.right;
    let height = visible + padding.top + padding.bottom;

    let area = if below {
        Rect::new(
            anchor.x.saturating_sub(padding.left),
            anchor.bottom(),
            width,
            height,
        )
    } else {
        Rect::new(
            anchor.right(),
            anchor.y.saturating_sub(padding.top),
            width,
            height,
        )
    };
    let area = fit_in(area, buf.area);
    let inner = Rect::new(
        area.x + padding.left.min(area.width),
        area.y + padding.top.min(area.height),
        area.width.saturating_sub(padding.left + padding.right),
        area.height.saturating_sub(padding.top + padding.bottom),
    );

    let style = widget.style;
    let focus_style = widget.focus_style.unwrap_or(revert_style(style));
    let disabled_style = style.patch(widget.disabled_style.unwrap_or_default());
    let divider_style = style.patch(widget.divider_style.unwrap_or_default());
    let innermost = open == node.path();

    fill_buf_area(buf, area, " ", style);
    if let Some(block) = &widget.block {
        block.clone().render(area, buf);
    }

    let mut item_areas = Vec::with_capacity(node.children().len());
    let mut y = inner.y;
    for (n, child) in node.children().iter().enumerate() {
        if child.is_hidden() || y >= inner.bottom() {
            item_areas.push(Rect::default());
            continue;
        }
        let row = Rect::new(inner.x, y, inner.width, 1);
        y += 1;

        if child.is_divider() {
            fill_buf_area(buf, row, DIVIDER_SYMBOL, divider_style);
        } else {
            let child_open = open.starts_with(child.path());
            let row_style = if (innermost && hot == Some(n)) || child_open {
                focus_style
            } else if child.is_readonly() {
                disabled_style
            } else {
                style
            };
            buf.set_style(row, row_style);
            let text_area = Rect::new(row.x + 1, row.y, row.width.saturating_sub(2), 1);
            Line::from(child.item().title_str()).render(text_area, buf);
            if child.is_submenu() && row.width >= 2 {
                buf.set_string(row.right() - 2, row.y, SUBMENU_ARROW, row_style);
            }
        }
        item_areas.push(row);
    }

    dropdowns.push(DropdownArea {
        path: node.path().to_vec(),
        area,
        item_areas: item_areas.clone(),
    });

    if let Some(n) = open.get(node.path().len()).copied() {
        if let (Some(child), Some(child_area)) = (node.children().get(n), item_areas.get(n)) {
            if child.is_submenu() && !child.is_hidden() {
                render_dropdown(
                    widget,
                    child,
                    *child_area,
                    false,
                    open,
                    hot,
                    buf,
                    dropdowns,
                );
            }
        }
    }
}

impl Default for MenuBarState {
    fn default() -> Self {
        Self {
            area: Default::default(),
            item_areas: Default::default(),
            dropdowns: Default::default(),
            selected: Default::default(),
            hot: Default::default(),
            focus: Default::default(),
            nodes: Default::default(),
            ctx: Default::default(),
            chain: Box::new(DropdownChain::new()),
            wired: false,
            non_exhaustive: NonExhaustive,
        }
    }
}

fn find_node<'n>(nodes: &'n [MenuNode], path: &[usize]) -> Option<&'n MenuNode> {
    let (first, rest) = path.split_first()?;
    nodes.get(*first)?.find(rest)
}

fn find_node_mut<'n>(nodes: &'n mut [MenuNode], path: &[usize]) -> Option<&'n mut MenuNode> {
    let (first, rest) = path.split_first()?;
    nodes.get_mut(*first)?.find_mut(rest)
}

fn register_dropdowns(chain: &mut dyn DropdownToggle, nodes: &[MenuNode]) -> usize {
    let mut count = 0;
    for node in nodes {
        if node.is_submenu() {
            chain.register(node.path());
            count += 1 + register_dropdowns(chain, node.children());
        }
    }
    count
}

impl MenuBarState {
    /// Instantiate the menu tree.
    ///
    /// The handler is shared by all nodes. Items with an action
    /// are bound immediately.
    pub fn new(menus: Vec<Rc<MenuItem>>, handler: Option<Rc<dyn ActionHandler>>) -> Self {
        Self::with_context(
            menus,
            NodeContext {
                handler,
                record: None,
            },
        )
    }

    /// Instantiate the menu tree with the record of the surrounding form.
    pub fn with_record(
        menus: Vec<Rc<MenuItem>>,
        handler: Option<Rc<dyn ActionHandler>>,
        record: RecordWatch,
    ) -> Self {
        Self::with_context(
            menus,
            NodeContext {
                handler,
                record: Some(record),
            },
        )
    }

    /// Instantiate the menu tree.
    pub fn with_context(menus: Vec<Rc<MenuItem>>, ctx: NodeContext) -> Self {
        let nodes = menus
            .into_iter()
            .enumerate()
            .map(|(n, item)| MenuNode::new(item, vec![n], &ctx))
            .collect();
        Self {
            nodes,
            ctx,
            ..Default::default()
        }
    }

    /// Set a focus name.
    pub fn named(mut self, name: &'static str) -> Self {
        self.focus = FocusFlag::named(name);
        self
    }

    /// Replace the toggle behaviour for the dropdowns.
    ///
    /// Must be set before the first click.
    pub fn with_toggle(mut self, toggle: impl DropdownToggle + 'static) -> Self {
        self.chain = Box::new(toggle);
        self.wired = false;
        self
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    /// Node by path.
    pub fn node(&self, path: &[usize]) -> Option<&MenuNode> {
        find_node(&self.nodes, path)
    }

    /// Node by path.
    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut MenuNode> {
        find_node_mut(&mut self.nodes, path)
    }

    /// Set a runtime attribute of a node by name.
    ///
    /// Hiding or disabling a node on the open dropdown chain
    /// closes all dropdowns.
    pub fn attr(&mut self, path: &[usize], name: &str, value: bool) -> Result<(), MenuError> {
        let Some(node) = self.node_mut(path) else {
            return Err(MenuError::NoSuchNode(path.to_vec()));
        };
        node.attr_str(name, value);
        let inert = node.is_hidden() || node.is_readonly();
        if inert && self.chain.open_path().starts_with(path) {
            debug!("menubar collapse, {:?} is {}", path, name);
            self.collapse();
        }
        Ok(())
    }

    /// The shared handler context.
    pub fn handler(&self) -> Option<&Rc<dyn ActionHandler>> {
        self.ctx.handler.as_ref()
    }

    /// Record of the surrounding form.
    pub fn record(&self) -> Option<&RecordWatch> {
        self.ctx.record.as_ref()
    }

    /// All configuration errors in the menu tree.
    pub fn validate(&self) -> Vec<MenuError> {
        let mut err = Vec::new();
        for node in &self.nodes {
            node.validate(&mut err);
        }
        err
    }

    /// Dropdowns have been registered.
    pub fn is_wired(&self) -> bool {
        self.wired
    }

    /// The toggle behaviour for the dropdowns.
    pub fn dropdown_toggle(&self) -> &dyn DropdownToggle {
        self.chain.as_ref()
    }

    /// Is the dropdown for this submenu open.
    pub fn is_open(&self, path: &[usize]) -> bool {
        self.chain.is_open(path)
    }

    /// Path of the innermost open dropdown.
    pub fn open_path(&self) -> Vec<usize> {
        self.chain.open_path()
    }

    /// Any dropdown open.
    pub fn popup_active(&self) -> bool {
        !self.chain.open_path().is_empty()
    }

    /// Close all dropdowns.
    pub fn collapse(&mut self) -> bool {
        self.hot = None;
        self.chain.collapse()
    }

    /// Register all dropdowns with the toggle. Runs once.
    fn wire(&mut self) {
        if self.wired {
            return;
        }
        self.wired = true;
        let count = register_dropdowns(self.chain.as_mut(), &self.nodes);
        debug!("menubar wired {} dropdowns", count);
    }

    /// Click on the node at path.
    ///
    /// Dispatches at most one of submenu-toggle, action or
    /// click-callback. Errors from the action are returned
    /// and leave the dropdowns as they were.
    pub fn click_path(&mut self, path: &[usize], event: &MenuClick) -> MenuResult {
        self.wire();

        let Some(node) = find_node(&self.nodes, path) else {
            return Err(MenuError::NoSuchNode(path.to_vec()));
        };
        let r = node.click(event, self.chain.as_mut())?;

        if r != Dispatch::Inert {
            if path.len() == 1 {
                self.selected = Some(path[0]);
            }
            self.hot = None;
        }
        Ok(MenuOutcome::Activated(r))
    }

    /// Children of the innermost open dropdown.
    fn open_children(&self) -> Option<&[MenuNode]> {
        let open = self.chain.open_path();
        if open.is_empty() {
            None
        } else {
            find_node(&self.nodes, &open).map(|v| v.children())
        }
    }

    /// First selectable item in the innermost dropdown.
    fn first_hot(&self) -> Option<usize> {
        self.open_children()?.iter().position(|v| !v.is_inert())
    }

    /// Highlighted item, if it exists in the innermost dropdown.
    fn valid_hot(&self) -> Option<usize> {
        let len = self.open_children().map(|v| v.len()).unwrap_or_default();
        self.hot.filter(|v| *v < len)
    }

    /// Move the highlight in the innermost dropdown.
    fn move_hot(&mut self, forward: bool) -> bool {
        let old = self.valid_hot();
        let Some(children) = self.open_children() else {
            return false;
        };
        let next = if forward {
            let start = old.map(|v| v + 1).unwrap_or(0);
            (start..children.len()).find(|v| !children[*v].is_inert())
        } else {
            let end = old.unwrap_or(children.len());
            (0..end).rev().find(|v| !children[*v].is_inert())
        };
        let changed = next.is_some() && next != old;
        if next.is_some() {
            self.hot = next;
        }
        changed
    }

    /// Next/previous selectable top-level menu.
    fn next_bar(&self, forward: bool) -> Option<usize> {
        let len = self.nodes.len();
        if forward {
            let start = self.selected.map(|v| v + 1).unwrap_or(0);
            (start..len).find(|v| !self.nodes[*v].is_inert())
        } else {
            let end = self.selected.unwrap_or(len);
            (0..end).rev().find(|v| !self.nodes[*v].is_inert())
        }
    }

    /// Select a top-level menu and show its dropdown,
    /// if another one was showing.
    fn select_bar(&mut self, n: usize) -> MenuOutcome {
        let was_open = self.popup_active();
        self.selected = Some(n);
        self.collapse();
        if was_open && self.nodes[n].is_submenu() {
            self.wire();
            self.chain.toggle(&[n]);
            self.hot = self.first_hot();
        }
        MenuOutcome::Selected(n)
    }

    /// Activate via keyboard.
    fn activate_key(&mut self, path: &[usize]) -> MenuResult {
        let r = self.click_path(path, &MenuClick::key(path))?;
        if r == MenuOutcome::Activated(Dispatch::SubMenu) && self.chain.is_open(path) {
            self.hot = self.first_hot();
        }
        Ok(r)
    }

    fn handle_dropdown_keys(&mut self, event: &crossterm::event::Event) -> MenuResult {
        let open = self.chain.open_path();
        let r = match event {
            ct_event!(keycode press Esc) => self.collapse().into(),
            ct_event!(keycode press Down) => self.move_hot(true).into(),
            ct_event!(keycode press Up) => self.move_hot(false).into(),
            ct_event!(keycode press Enter) | ct_event!(key press ' ') => {
                if let Some(hot) = self.valid_hot() {
                    let mut path = open.clone();
                    path.push(hot);
                    return self.activate_key(&path);
                } else {
                    MenuOutcome::Unchanged
                }
            }
            ct_event!(keycode press Right) => {
                let hot_submenu = self.valid_hot().and_then(|hot| {
                    let mut path = open.clone();
                    path.push(hot);
                    self.node(&path)
                        .filter(|v| v.is_submenu())
                        .map(|_| path)
                });
                if let Some(path) = hot_submenu {
                    return self.activate_key(&path);
                } else if let Some(n) = self.next_bar(true) {
                    self.select_bar(n)
                } else {
                    MenuOutcome::Unchanged
                }
            }
            ct_event!(keycode press Left) => {
                if open.len() > 1 {
                    self.chain.toggle(&open);
                    self.hot = open.last().copied();
                    MenuOutcome::Changed
                } else if let Some(n) = self.next_bar(false) {
                    self.select_bar(n)
                } else {
                    MenuOutcome::Unchanged
                }
            }
            _ => MenuOutcome::Continue,
        };
        Ok(r)
    }

    fn handle_bar_keys(&mut self, event: &crossterm::event::Event) -> MenuResult {
        let r = match event {
            ct_event!(keycode press Left) => {
                if let Some(n) = self.next_bar(false) {
                    self.select_bar(n)
                } else {
                    MenuOutcome::Unchanged
                }
            }
            ct_event!(keycode press Right) => {
                if let Some(n) = self.next_bar(true) {
                    self.select_bar(n)
                } else {
                    MenuOutcome::Unchanged
                }
            }
            ct_event!(keycode press Home) => {
                self.selected = None;
                match self.next_bar(true) {
                    Some(n) => self.select_bar(n),
                    None => MenuOutcome::Unchanged,
                }
            }
            ct_event!(keycode press End) => {
                self.selected = None;
                match self.next_bar(false) {
                    Some(n) => self.select_bar(n),
                    None => MenuOutcome::Unchanged,
                }
            }
            ct_event!(keycode press Down)
            | ct_event!(keycode press Enter)
            | ct_event!(key press ' ') => {
                if let Some(n) = self.selected {
                    return self.activate_key(&[n]);
                } else {
                    MenuOutcome::Continue
                }
            }
            _ => MenuOutcome::Continue,
        };
        Ok(r)
    }
}

impl HasFocus for MenuBarState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.widget_with_flags(self.focus(), self.area(), self.area_z(), self.navigable());
        for dropdown in &self.dropdowns {
            builder.widget_with_flags(self.focus(), dropdown.area, 1, Navigation::Mouse);
        }
    }

    fn focus(&self) -> FocusFlag {
        self.focus.clone()
    }

    fn area(&self) -> Rect {
        self.area
    }
}

impl HandleEvent<crossterm::event::Event, Popup, MenuResult> for MenuBarState {
    fn handle(&mut self, event: &crossterm::event::Event, _qualifier: Popup) -> MenuResult {
        if !self.popup_active() {
            return Ok(MenuOutcome::Continue);
        }

        match event {
            ct_event!(mouse down Left for col, row) => {
                let pos = Position::new(*col, *row);
                let hit = self
                    .dropdowns
                    .iter()
                    .rev()
                    .find(|v| v.area.contains(pos))
                    .map(|v| (v.path.clone(), item_at(&v.item_areas, (*col, *row))));
                match hit {
                    Some((mut path, Some(n))) => {
                        path.push(n);
                        self.click_path(&path, &MenuClick::mouse(&path, (*col, *row)))
                    }
                    Some((_, None)) => Ok(MenuOutcome::Unchanged),
                    None => Ok(MenuOutcome::Continue),
                }
            }
            _ if self.focus.get() => self.handle_dropdown_keys(event),
            _ => Ok(MenuOutcome::Continue),
        }
    }
}

impl HandleEvent<crossterm::event::Event, Regular, MenuResult> for MenuBarState {
    fn handle(&mut self, event: &crossterm::event::Event, _qualifier: Regular) -> MenuResult {
        let r = self.handle(event, Popup)?;
        if r.is_consumed() {
            return Ok(r);
        }
        if self.focus.get() && !self.popup_active() {
            let r = self.handle_bar_keys(event)?;
            if r.is_consumed() {
                return Ok(r);
            }
        }
        self.handle(event, MouseOnly)
    }
}

impl HandleEvent<crossterm::event::Event, MouseOnly, MenuResult> for MenuBarState {
    fn handle(&mut self, event: &crossterm::event::Event, _qualifier: MouseOnly) -> MenuResult {
        match event {
            ct_event!(mouse down Left for col, row) => {
                if let Some(n) = item_at(&self.item_areas, (*col, *row)) {
                    self.click_path(&[n], &MenuClick::mouse(&[n], (*col, *row)))
                } else {
                    // click outside closes the dropdowns, but
                    // leaves the event for others.
                    if self.popup_active() {
                        self.collapse();
                    }
                    Ok(MenuOutcome::Continue)
                }
            }
            _ => Ok(MenuOutcome::Continue),
        }
    }
}

/// Handle all events.
/// Key events are only processed if focus is true.
/// Mouse events are processed if they are in range.
pub fn handle_events(
    state: &mut MenuBarState,
    focus: bool,
    event: &crossterm::event::Event,
) -> MenuResult {
    state.focus.set(focus);
    state.handle(event, Regular)
}

/// Handle events for the dropdowns only.
///
/// This one is separate, as it needs to be called before other event-handlers
/// to cope with overlapping regions.
pub fn handle_popup_events(
    state: &mut MenuBarState,
    focus: bool,
    event: &crossterm::event::Event,
) -> MenuResult {
    state.focus.set(focus);
    state.handle(event, Popup)
}

/// Handle only mouse-events.
pub fn handle_mouse_events(
    state: &mut MenuBarState,
    event: &crossterm::event::Event,
) -> MenuResult {
    state.handle(event, MouseOnly)
}
