use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Style, Stylize};
use ratatui::widgets::{Block, Padding};
use std::mem;

/// Returns a new style with fg and bg swapped.
///
/// This is not the same as setting Style::reversed().
/// The latter sends special controls to the terminal,
/// the former just swaps.
pub(crate) fn revert_style(mut style: Style) -> Style {
    if style.fg.is_some() || style.bg.is_some() {
        mem::swap(&mut style.fg, &mut style.bg);
        style
    } else {
        style.reversed()
    }
}

/// Space taken by the block on each side.
pub(crate) fn block_padding(block: &Option<Block<'_>>) -> Padding {
    let area = Rect::new(0, 0, 20, 20);
    let inner = if let Some(block) = block {
        block.inner(area)
    } else {
        area
    };
    Padding {
        left: inner.left() - area.left(),
        right: area.right() - inner.right(),
        top: inner.top() - area.top(),
        bottom: area.bottom() - inner.bottom(),
    }
}

/// Index of the area that contains the position.
pub(crate) fn item_at(areas: &[Rect], pos: (u16, u16)) -> Option<usize> {
    let pos = Position::new(pos.0, pos.1);
    areas.iter().position(|v| v.contains(pos))
}

/// Fill the area with the symbol and style.
pub(crate) fn fill_buf_area(buf: &mut Buffer, area: Rect, symbol: &str, style: Style) {
    let area = area.intersection(buf.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.reset();
                cell.set_symbol(symbol);
                cell.set_style(style);
            }
        }
    }
}

/// Move the area inside the bounds, if possible.
pub(crate) fn fit_in(area: Rect, bounds: Rect) -> Rect {
    let mut area = area;
    if area.right() > bounds.right() {
        area.x = bounds.right().saturating_sub(area.width).max(bounds.x);
    }
    if area.bottom() > bounds.bottom() {
        area.y = bounds.bottom().saturating_sub(area.height).max(bounds.y);
    }
    area.intersection(bounds)
}
