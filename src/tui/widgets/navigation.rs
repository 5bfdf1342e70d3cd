//! Keyboard navigation between cards using their layout rectangles.

use tracing::debug;

use crate::{
    family::{LayoutConfig, LayoutNode, PersonId},
    geometry::Rect,
};

/// Region for keyboard navigation, in layout coordinates so that cards
/// outside the viewport are reachable.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRegion {
    pub rect: Rect,
    pub person_id: PersonId,
}

/// Direction for spatial navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Check if `other` is ahead of `cur` in this direction.
    pub fn is_ahead(self, cur: &Rect, other: &Rect) -> bool {
        match self {
            Self::Left => other.right() <= cur.x,
            Self::Right => other.x >= cur.right(),
            Self::Up => other.bottom() <= cur.y,
            Self::Down => other.y >= cur.bottom(),
        }
    }

    /// Gap from `cur` to `other` in this direction.
    pub fn distance(self, cur: &Rect, other: &Rect) -> f64 {
        match self {
            Self::Left => (cur.x - other.right()).max(0.0),
            Self::Right => (other.x - cur.right()).max(0.0),
            Self::Up => (cur.y - other.bottom()).max(0.0),
            Self::Down => (other.y - cur.bottom()).max(0.0),
        }
    }

    /// Center offset on the perpendicular axis.
    pub fn drift(self, cur: &Rect, other: &Rect) -> f64 {
        if self.is_horizontal() {
            (cur.center().y - other.center().y).abs()
        } else {
            (cur.center().x - other.center().x).abs()
        }
    }

    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Check if two 1D ranges overlap.
fn ranges_overlap(a_start: f64, a_len: f64, b_start: f64, b_len: f64) -> bool {
    a_start < b_start + b_len && b_start < a_start + a_len
}

pub fn build_navigation_regions(
    nodes: &[LayoutNode],
    config: &LayoutConfig,
) -> Vec<NavigationRegion> {
    nodes
        .iter()
        .map(|node| NavigationRegion {
            rect: node.card(config),
            person_id: node.person.id.clone(),
        })
        .collect()
}

/// Nearest card in `direction`. Cards overlapping the current one on the
/// perpendicular axis are preferred; otherwise the closest card ahead wins.
pub fn find_nearest_in_direction<'r>(
    regions: &'r [NavigationRegion],
    current: &str,
    direction: Direction,
) -> Option<&'r PersonId> {
    let Some(cur) = regions.iter().find(|r| r.person_id == current) else {
        debug!(current, "Current selection not found in navigation regions");
        return None;
    };

    let ahead: Vec<&NavigationRegion> = regions
        .iter()
        .filter(|r| direction.is_ahead(&cur.rect, &r.rect))
        .collect();
    let aligned: Vec<&NavigationRegion> = ahead
        .iter()
        .copied()
        .filter(|r| {
            if direction.is_horizontal() {
                ranges_overlap(cur.rect.y, cur.rect.height, r.rect.y, r.rect.height)
            } else {
                ranges_overlap(cur.rect.x, cur.rect.width, r.rect.x, r.rect.width)
            }
        })
        .collect();

    debug!(
        current,
        ?direction,
        ahead = ahead.len(),
        aligned = aligned.len(),
        "Navigation candidates"
    );

    let candidates = if aligned.is_empty() { ahead } else { aligned };
    candidates
        .into_iter()
        .min_by(|a, b| {
            let key = |r: &NavigationRegion| {
                (
                    direction.distance(&cur.rect, &r.rect),
                    direction.drift(&cur.rect, &r.rect),
                )
            };
            let (da, wa) = key(*a);
            let (db, wb) = key(*b);
            da.total_cmp(&db).then(wa.total_cmp(&wb))
        })
        .map(|r| &r.person_id)
}
