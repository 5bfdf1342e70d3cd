//! Widgets for the tree viewer.

pub mod canvas;
pub mod help_menu;
pub mod interactive_widget;
pub mod minimap;
pub mod navigation;
pub mod search;
pub mod status_bar;
pub mod theme;
pub mod tree_canvas;

pub use crossterm::event::KeyEvent;
pub use interactive_widget::InteractiveStatefulWidget;
use ratatui::layout::Rect;

use crate::family::PersonId;

/// Screen area of a drawn card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickRegion {
    pub area: Rect,
    pub person_id: PersonId,
}

impl ClickRegion {
    pub const fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height
    }
}

/// Topmost card under a terminal cell.
pub fn card_at(regions: &[ClickRegion], column: u16, row: u16) -> Option<&PersonId> {
    regions
        .iter()
        .rev()
        .find(|r| r.contains(column, row))
        .map(|r| &r.person_id)
}
