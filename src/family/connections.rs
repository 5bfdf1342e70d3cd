//! Line geometry between placed cards: couple links and bus-routed
//! parent/child links.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use super::{
    index::FamilyIndex,
    layout::{LayoutConfig, TreeLayout},
    model::{FamilyUnit, PersonId},
};
use crate::geometry::Point;

/// Fraction of the parent-to-child gap at which the shared bus runs.
pub const BUS_RATIO: f64 = 0.45;

const SAME_ROW_EPSILON: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    /// Dashed line between partners.
    Couple,
    /// Straight parent-to-child line for an only child.
    Direct,
    /// Vertical line from the parents down to the bus.
    BusStub,
    /// Horizontal line shared by all siblings.
    Bus,
    /// Vertical line from the bus down to one child.
    BusDrop,
}

impl SegmentKind {
    pub const fn is_couple(self) -> bool {
        matches!(self, Self::Couple)
    }

    pub const fn is_parent_child(self) -> bool {
        !self.is_couple()
    }
}

/// One straight line in layout coordinates. The id only depends on family
/// and person ids, so it survives re-layouts with the same topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionSegment {
    pub id: String,
    pub kind: SegmentKind,
    pub from: Point,
    pub to: Point,
}

impl ConnectionSegment {
    /// Where the couple marker is drawn.
    pub fn midpoint(&self) -> Point {
        self.from.midpoint(self.to)
    }

    pub const fn is_dashed(&self) -> bool {
        self.kind.is_couple()
    }
}

/// Route every connection between the cards of `layout`.
pub fn route_connections(
    families: &[FamilyUnit],
    index: &FamilyIndex<'_>,
    layout: &TreeLayout,
    collapsed: &HashSet<PersonId>,
    config: &LayoutConfig,
) -> Vec<ConnectionSegment> {
    let router = Router {
        index,
        config,
        positions: layout
            .nodes
            .iter()
            .map(|n| (n.person.id.as_str(), Point::new(n.x, n.y)))
            .collect(),
    };

    let mut segments = Vec::new();
    let mut groups: Vec<ChildGroup<'_>> = Vec::new();
    let mut by_anchor: HashMap<(u64, u64), usize> = HashMap::new();
    for family in families {
        let Some((anchor, lines)) = router.route_family(family, collapsed, &mut segments) else {
            continue;
        };
        let key = (anchor.x.to_bits(), anchor.y.to_bits());
        let slot = *by_anchor.entry(key).or_insert_with(|| {
            groups.push(ChildGroup {
                first_family: &family.id,
                anchor,
                lines: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].lines.extend(lines);
    }
    for group in &mut groups {
        group.route(&mut segments);
    }

    debug!(
        families = families.len(),
        groups = groups.len(),
        segments = segments.len(),
        "Routed connections"
    );
    segments
}

/// A child line waiting to be drawn from its parents' anchor point.
struct ChildLine<'s> {
    family_id: &'s str,
    child: &'s str,
    /// Top center of the child's card.
    top: Point,
}

/// Every child line leaving one anchor point. A father with several
/// mother-less families has a single anchor, so their children share a bus.
struct ChildGroup<'s> {
    first_family: &'s str,
    anchor: Point,
    lines: Vec<ChildLine<'s>>,
}

impl ChildGroup<'_> {
    fn route(&mut self, out: &mut Vec<ConnectionSegment>) {
        match self.lines.as_slice() {
            [] => {}
            [line] => out.push(ConnectionSegment {
                id: format!("child-{}-{}", line.family_id, line.child),
                kind: SegmentKind::Direct,
                from: self.anchor,
                to: line.top,
            }),
            _ => {
                self.lines.sort_by(|a, b| a.top.x.total_cmp(&b.top.x));
                self.bus(out);
            }
        }
    }

    /// Stub, shared bus and one drop per child. Lines are sorted by x.
    fn bus(&self, out: &mut Vec<ConnectionSegment>) {
        let (Some(first), Some(last)) = (self.lines.first(), self.lines.last()) else {
            return;
        };
        let anchor = self.anchor;
        let nearest = self.lines.iter().map(|l| l.top.y).fold(f64::INFINITY, f64::min);
        let bus_y = anchor.y + (nearest - anchor.y) * BUS_RATIO;

        out.push(ConnectionSegment {
            id: format!("stub-{}", self.first_family),
            kind: SegmentKind::BusStub,
            from: anchor,
            to: Point::new(anchor.x, bus_y),
        });
        out.push(ConnectionSegment {
            id: format!("bus-{}", self.first_family),
            kind: SegmentKind::Bus,
            from: Point::new(first.top.x, bus_y),
            to: Point::new(last.top.x, bus_y),
        });
        out.extend(self.lines.iter().map(|line| ConnectionSegment {
            id: format!("drop-{}-{}", line.family_id, line.child),
            kind: SegmentKind::BusDrop,
            from: Point::new(line.top.x, bus_y),
            to: line.top,
        }));
    }
}

struct Router<'r, 'a> {
    index: &'r FamilyIndex<'a>,
    config: &'r LayoutConfig,
    /// Top-left corner of each placed card.
    positions: HashMap<&'r str, Point>,
}

impl<'a> Router<'_, 'a> {
    fn position(&self, id: Option<&str>) -> Option<Point> {
        id.and_then(|id| self.positions.get(id).copied())
    }

    /// Push the couple line and return the anchor point with the family's
    /// child lines, or `None` when no child line leaves this family.
    fn route_family<'s>(
        &self,
        family: &'s FamilyUnit,
        collapsed: &HashSet<PersonId>,
        out: &mut Vec<ConnectionSegment>,
    ) -> Option<(Point, Vec<ChildLine<'s>>)>
    where
        'a: 's,
    {
        let father = self.position(family.father_id.as_deref());
        let mother = self.position(family.mother_id.as_deref());
        let half_card = self.config.card_height / 2.0;

        let couple_from = match (family.father_id.as_deref(), father, mother) {
            (Some(father_id), Some(f), Some(m)) => {
                let from = Point::new(self.left_neighbour_edge(father_id, f, m), f.y + half_card);
                out.push(ConnectionSegment {
                    id: format!("couple-{}", family.id),
                    kind: SegmentKind::Couple,
                    from,
                    to: Point::new(m.x, m.y + half_card),
                });
                Some(from.x)
            }
            _ => None,
        };

        let anchor_id = family.father_id.as_deref().or(family.mother_id.as_deref());
        if anchor_id.is_some_and(|id| collapsed.contains(id)) {
            return None;
        }
        let parent = father.or(mother)?;

        let anchor_x = match (couple_from, mother) {
            (Some(from_x), Some(m)) => (from_x + m.x) / 2.0,
            _ => parent.x + self.config.card_width / 2.0,
        };
        let anchor = Point::new(anchor_x, parent.y + self.config.card_height);

        let lines: Vec<ChildLine<'s>> = self
            .index
            .children_of(&family.id)
            .iter()
            .copied()
            .filter(|link| {
                self.index
                    .parent_family(&link.person_id)
                    .is_some_and(|owner| owner.id == family.id)
            })
            .filter_map(|link| {
                let pos = self.positions.get(link.person_id.as_str())?;
                Some(ChildLine {
                    family_id: &family.id,
                    child: &link.person_id,
                    top: Point::new(pos.x + self.config.card_width / 2.0, pos.y),
                })
            })
            .collect();

        (!lines.is_empty()).then_some((anchor, lines))
    }

    /// Right edge of the card directly left of the mother: the father, or an
    /// earlier wife of his on the same row.
    fn left_neighbour_edge(&self, father_id: &str, father: Point, mother: Point) -> f64 {
        let left = self
            .index
            .families_as_father(father_id)
            .iter()
            .filter_map(|f| self.position(f.mother_id.as_deref()))
            .filter(|p| p.x < mother.x && (p.y - mother.y).abs() < SAME_ROW_EPSILON)
            .map(|p| p.x)
            .fold(father.x, f64::max);
        left + self.config.card_width
    }
}
