//! Overview of the whole tree with the visible region outlined.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Points, Rectangle},
        Block, Clear, StatefulWidget, Widget,
    },
};

use super::{
    canvas::{cell_center, pixel_size},
    theme::Theme,
};
use crate::{
    family::{LayoutConfig, TreeView},
    geometry::{Point, Size},
    viewport::{Minimap, ViewportState},
};

/// Minimap size in cells, borders included.
pub const MINIMAP_COLUMNS: u16 = 34;
pub const MINIMAP_ROWS: u16 = 10;

/// Where the minimap was last drawn, for mouse hit testing.
#[derive(Debug, Default)]
pub struct MinimapState {
    pub visible: bool,
    inner: Option<Rect>,
    minimap: Option<Minimap>,
}

impl MinimapState {
    pub const fn new() -> Self {
        Self {
            visible: true,
            inner: None,
            minimap: None,
        }
    }

    pub const fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Minimap point and mapping under a terminal cell, if the cell is on
    /// the minimap.
    pub fn hit(&self, column: u16, row: u16) -> Option<(Point, Minimap)> {
        let (inner, minimap) = (self.inner?, self.minimap?);
        let inside = column >= inner.x
            && column < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height;
        inside.then(|| (cell_center(inner, column, row), minimap))
    }
}

/// Bottom-right area of `area` reserved for the minimap.
pub fn minimap_area(area: Rect) -> Rect {
    let width = MINIMAP_COLUMNS.min(area.width);
    let height = MINIMAP_ROWS.min(area.height);
    Rect::new(
        area.x + area.width - width,
        area.y + area.height - height,
        width,
        height,
    )
}

pub struct MinimapWidget<'a> {
    view: &'a TreeView,
    viewport: &'a ViewportState,
    config: &'a LayoutConfig,
}

impl<'a> MinimapWidget<'a> {
    pub const fn new(
        view: &'a TreeView,
        viewport: &'a ViewportState,
        config: &'a LayoutConfig,
    ) -> Self {
        Self {
            view,
            viewport,
            config,
        }
    }
}

impl StatefulWidget for MinimapWidget<'_> {
    type State = MinimapState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.inner = None;
        state.minimap = None;
        if !state.visible || self.view.layout.is_empty() {
            return;
        }

        let block = Block::bordered()
            .title(" Map ")
            .border_style(Style::new().fg(Theme::BORDER));
        let inner = block.inner(area);
        let size = pixel_size(inner);
        let minimap = Minimap::new(
            size,
            Size::new(self.view.layout.width, self.view.layout.height),
        );
        let x_offset = self.view.layout.x_offset;
        let half = Point::new(self.config.card_width / 2.0, self.config.card_height / 2.0);
        let view_box = minimap.project_rect(self.viewport.view_box());

        Clear.render(area, buf);
        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([0.0, size.width])
            .y_bounds([0.0, size.height])
            .paint(|ctx| {
                for node in &self.view.layout.nodes {
                    let center = minimap.to_minimap(Point::new(node.x + x_offset, node.y) + half);
                    ctx.draw(&Points {
                        coords: &[(center.x, size.height - center.y)],
                        color: Theme::person_color(&node.person),
                    });
                }
                ctx.draw(&Rectangle {
                    x: view_box.x,
                    y: size.height - view_box.bottom(),
                    width: view_box.width,
                    height: view_box.height,
                    color: Theme::MINIMAP_VIEW,
                });
            })
            .render(area, buf);

        state.inner = Some(inner);
        state.minimap = Some(minimap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimap_area_sits_bottom_right() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(minimap_area(area), Rect::new(66, 30, 34, 10));
        let tiny = Rect::new(0, 0, 20, 5);
        assert_eq!(minimap_area(tiny), tiny);
    }

    #[test]
    fn test_hit_only_inside_inner_area() {
        let state = MinimapState {
            visible: true,
            inner: Some(Rect::new(10, 10, 4, 2)),
            minimap: Some(Minimap::new(Size::new(40.0, 40.0), Size::new(400.0, 400.0))),
        };
        let (point, _) = state.hit(11, 10).unwrap();
        assert_eq!(point, Point::new(15.0, 10.0));
        assert!(state.hit(14, 10).is_none());
        assert!(MinimapState::new().hit(11, 10).is_none());
    }
}
