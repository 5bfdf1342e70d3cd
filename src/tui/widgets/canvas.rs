//! Projection of layout pixels onto terminal cells, with viewport clipping.

use ratatui::layout::Rect;

use crate::{
    geometry::{Point, Size},
    viewport::ViewportState,
};

/// Horizontal content pixels per terminal column at scale 1.
pub const PX_PER_COLUMN: f64 = 10.0;
/// Vertical content pixels per terminal row at scale 1.
pub const PX_PER_ROW: f64 = 20.0;

/// Pixel size of a terminal area.
pub fn pixel_size(area: Rect) -> Size {
    Size::new(
        f64::from(area.width) * PX_PER_COLUMN,
        f64::from(area.height) * PX_PER_ROW,
    )
}

/// Pixel position (relative to `area`) of the center of a terminal cell.
pub fn cell_center(area: Rect, column: u16, row: u16) -> Point {
    Point::new(
        (f64::from(column.saturating_sub(area.x)) + 0.5) * PX_PER_COLUMN,
        (f64::from(row.saturating_sub(area.y)) + 0.5) * PX_PER_ROW,
    )
}

/// Maps layout coordinates to cells of one area. Cell coordinates are
/// relative to the area and may fall outside it.
#[derive(Debug, Clone, Copy)]
pub struct CellProjection {
    pub area: Rect,
    scale: f64,
    pan: Point,
    x_offset: f64,
}

impl CellProjection {
    pub const fn new(area: Rect, viewport: &ViewportState, x_offset: f64) -> Self {
        Self {
            area,
            scale: viewport.scale,
            pan: viewport.pan,
            x_offset,
        }
    }

    /// Screen pixels of a layout point, relative to the area.
    pub fn screen(&self, layout: Point) -> Point {
        Point::new(
            self.pan.x + self.scale * (layout.x + self.x_offset),
            self.pan.y + self.scale * layout.y,
        )
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn cell(&self, layout: Point) -> (i32, i32) {
        let screen = self.screen(layout);
        (
            (screen.x / PX_PER_COLUMN).floor() as i32,
            (screen.y / PX_PER_ROW).floor() as i32,
        )
    }

    /// Cell size of a `width` x `height` pixel box, at least one cell.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn cells(&self, width: f64, height: f64) -> (u16, u16) {
        let columns = (width * self.scale / PX_PER_COLUMN).round().max(1.0);
        let rows = (height * self.scale / PX_PER_ROW).round().max(1.0);
        (
            columns.min(f64::from(u16::MAX)) as u16,
            rows.min(f64::from(u16::MAX)) as u16,
        )
    }

    /// Absolute buffer position of a relative cell, if it is inside the area.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn to_buffer(&self, column: i32, row: i32) -> Option<(u16, u16)> {
        let inside = column >= 0
            && row >= 0
            && column < i32::from(self.area.width)
            && row < i32::from(self.area.height);
        inside.then(|| (self.area.x + column as u16, self.area.y + row as u16))
    }

    /// Clip a relative rectangle to the area. Returns None if not visible.
    pub fn clip(&self, x: i32, y: i32, width: u16, height: u16) -> Option<Rect> {
        if x >= i32::from(self.area.width)
            || y >= i32::from(self.area.height)
            || x + i32::from(width) <= 0
            || y + i32::from(height) <= 0
        {
            return None;
        }

        let (rx, rw) = clip_axis(x, width, self.area.x, self.area.width);
        let (ry, rh) = clip_axis(y, height, self.area.y, self.area.height);

        (rw > 0 && rh > 0).then_some(Rect::new(rx, ry, rw, rh))
    }
}

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
fn clip_axis(rel_pos: i32, size: u16, origin: u16, area_size: u16) -> (u16, u16) {
    if rel_pos < 0 {
        let clip = (-rel_pos) as u16;
        (origin, size.saturating_sub(clip).min(area_size))
    } else {
        let pos = rel_pos as u16;
        (origin + pos, size.min(area_size.saturating_sub(pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::ViewportConfig;

    fn projection(scale: f64, pan: Point) -> CellProjection {
        let area = Rect::new(2, 1, 80, 24);
        let mut viewport = ViewportState::new(pixel_size(area), &ViewportConfig::default());
        viewport.scale = scale;
        viewport.pan = pan;
        CellProjection::new(area, &viewport, 70.0)
    }

    #[test]
    fn test_layout_point_maps_through_offset_and_scale() {
        let p = projection(1.0, Point::new(0.0, 0.0));
        assert_eq!(p.cell(Point::new(0.0, 20.0)), (7, 1));
        let p = projection(0.5, Point::new(100.0, 40.0));
        assert_eq!(p.cell(Point::new(130.0, 80.0)), (20, 4));
    }

    #[test]
    fn test_card_cells_follow_scale() {
        let p = projection(0.9, Point::default());
        assert_eq!(p.cells(180.0, 80.0), (16, 4));
        let p = projection(0.2, Point::default());
        assert_eq!(p.cells(180.0, 80.0), (4, 1));
    }

    #[test]
    fn test_clip_to_area() {
        let p = projection(1.0, Point::default());
        assert_eq!(p.clip(-3, 0, 10, 2), Some(Rect::new(2, 1, 7, 2)));
        assert_eq!(p.clip(78, 23, 10, 5), Some(Rect::new(80, 24, 2, 1)));
        assert_eq!(p.clip(80, 0, 4, 4), None);
        assert_eq!(p.clip(-10, 0, 10, 1), None);
    }

    #[test]
    fn test_to_buffer_rejects_outside_cells() {
        let p = projection(1.0, Point::default());
        assert_eq!(p.to_buffer(0, 0), Some((2, 1)));
        assert_eq!(p.to_buffer(80, 0), None);
        assert_eq!(p.to_buffer(-1, 3), None);
    }
}
