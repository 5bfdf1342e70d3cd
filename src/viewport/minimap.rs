use serde::Serialize;

use crate::geometry::{Point, Rect, Size};

/// Share of the minimap the tree occupies along its tighter axis.
pub const MINIMAP_FILL: f64 = 0.9;

/// Mapping between content space and a minimap of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Minimap {
    pub size: Size,
    pub tree: Size,
}

impl Minimap {
    pub const fn new(size: Size, tree: Size) -> Self {
        Self { size, tree }
    }

    /// Content-to-minimap factor. Zero for a degenerate tree.
    pub fn scale(&self) -> f64 {
        if self.tree.width <= 0.0 || self.tree.height <= 0.0 {
            return 0.0;
        }
        (self.size.width / self.tree.width).min(self.size.height / self.tree.height) * MINIMAP_FILL
    }

    pub fn to_minimap(&self, content: Point) -> Point {
        content.scaled(self.scale())
    }

    pub fn to_content(&self, minimap: Point) -> Option<Point> {
        let scale = self.scale();
        (scale > 0.0).then(|| minimap.scaled(1.0 / scale))
    }

    /// The viewport rectangle as drawn on the minimap.
    pub fn project_rect(&self, content: Rect) -> Rect {
        let scale = self.scale();
        Rect::new(
            content.x * scale,
            content.y * scale,
            content.width * scale,
            content.height * scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_uses_tighter_axis() {
        let minimap = Minimap::new(Size::new(160.0, 100.0), Size::new(1600.0, 500.0));
        assert!((minimap.scale() - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_round_trip_through_minimap() {
        let minimap = Minimap::new(Size::new(160.0, 100.0), Size::new(800.0, 400.0));
        let content = Point::new(420.0, 130.0);
        let back = minimap.to_content(minimap.to_minimap(content)).unwrap();
        assert!(back.distance(content) < 1e-9);
    }

    #[test]
    fn test_empty_tree_has_no_mapping() {
        let minimap = Minimap::new(Size::new(160.0, 100.0), Size::default());
        assert!(minimap.to_content(Point::new(10.0, 10.0)).is_none());
    }
}
