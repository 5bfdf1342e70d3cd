//! Tree layout: bottom-up subtree widths, then top-down x assignment, with y
//! taken from the generation number.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    index::FamilyIndex,
    model::{Person, PersonId},
};
use crate::{error::ConfigError, geometry::Rect};

/// Card and spacing dimensions in content pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub card_width: f64,
    pub card_height: f64,
    /// Vertical distance between two generations.
    pub level_height: f64,
    pub sibling_gap: f64,
    pub couple_gap: f64,
    pub top_margin: f64,
    /// Space kept left of the leftmost card once `x_offset` is applied.
    pub left_margin: f64,
    /// Added to the content extent when reporting width and height.
    pub bounds_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 180.0,
            card_height: 80.0,
            level_height: 140.0,
            sibling_gap: 24.0,
            couple_gap: 12.0,
            top_margin: 20.0,
            left_margin: 70.0,
            bounds_margin: 100.0,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("card_width", self.card_width),
            ("card_height", self.card_height),
            ("level_height", self.level_height),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("sibling_gap", self.sibling_gap),
            ("couple_gap", self.couple_gap),
            ("top_margin", self.top_margin),
            ("left_margin", self.left_margin),
            ("bounds_margin", self.bounds_margin),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}

/// A placed person.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub person: Person,
    pub x: f64,
    pub y: f64,
    pub collapsed: bool,
    /// The person fathers children in the full snapshot, shown or not.
    pub has_children: bool,
}

impl LayoutNode {
    pub fn id(&self) -> &str {
        &self.person.id
    }

    /// Card rectangle in layout coordinates.
    pub fn card(&self, config: &LayoutConfig) -> Rect {
        Rect::new(self.x, self.y, config.card_width, config.card_height)
    }
}

/// Placed nodes plus the extent of the drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeLayout {
    pub nodes: Vec<LayoutNode>,
    pub width: f64,
    pub height: f64,
    /// Shift to apply to every x so the leftmost card sits at `left_margin`.
    pub x_offset: f64,
}

impl TreeLayout {
    pub fn find_node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.person.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Label shown at the left edge for each generation row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationHeader {
    pub generation: u32,
    pub y: f64,
    pub count: usize,
}

/// Top row and head count per generation, ascending.
pub fn generation_headers(nodes: &[LayoutNode]) -> Vec<GenerationHeader> {
    let mut rows: BTreeMap<u32, GenerationHeader> = BTreeMap::new();
    for node in nodes {
        let generation = node.person.level();
        rows.entry(generation)
            .and_modify(|row| {
                row.y = row.y.min(node.y);
                row.count += 1;
            })
            .or_insert(GenerationHeader {
                generation,
                y: node.y,
                count: 1,
            });
    }
    rows.into_values().collect()
}

/// Lay out the visible part of `people`.
///
/// People that cannot be reached from a root (for instance a child whose
/// father is collapsed) are left out rather than reported.
pub fn layout_tree(
    people: &[Person],
    index: &FamilyIndex<'_>,
    visible: &HashSet<PersonId>,
    collapsed: &HashSet<PersonId>,
    config: &LayoutConfig,
) -> TreeLayout {
    let shown: Vec<&Person> = people
        .iter()
        .filter(|p| visible.contains(&p.id))
        .collect();
    if shown.is_empty() {
        return TreeLayout::default();
    }

    let mut pass = LayoutPass::new(index, visible, collapsed, config, &shown);

    let roots: Vec<&str> = shown
        .iter()
        .map(|&p| p.id.as_str())
        .filter(|id| pass.is_root(id))
        .collect();

    let mut start_x = 0.0;
    for &root in &roots {
        pass.assign(root, start_x);
        start_x += pass.subtree_width(root) + config.sibling_gap * 2.0;
    }

    let min_generation = shown.iter().map(|p| p.level()).min().unwrap_or(1);
    let nodes: Vec<LayoutNode> = shown
        .iter()
        .filter_map(|&person| {
            let x = *pass.x.get(person.id.as_str())?;
            Some(LayoutNode {
                person: person.clone(),
                x,
                y: f64::from(person.level() - min_generation) * config.level_height
                    + config.top_margin,
                collapsed: collapsed.contains(&person.id),
                has_children: index.fathers_children(&person.id),
            })
        })
        .collect();

    debug!(
        visible = shown.len(),
        roots = roots.len(),
        placed = nodes.len(),
        dropped = shown.len() - nodes.len(),
        "Computed tree layout"
    );

    bounded(nodes, config)
}

fn bounded(nodes: Vec<LayoutNode>, config: &LayoutConfig) -> TreeLayout {
    if nodes.is_empty() {
        return TreeLayout::default();
    }
    let (min_x, max_x, max_y) = nodes.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64),
        |(min_x, max_x, max_y), n| {
            (
                min_x.min(n.x),
                max_x.max(n.x + config.card_width),
                max_y.max(n.y + config.card_height),
            )
        },
    );
    TreeLayout {
        nodes,
        width: max_x - min_x + config.bounds_margin,
        height: max_y + config.bounds_margin,
        x_offset: -min_x + config.left_margin,
    }
}

struct LayoutPass<'i, 'a> {
    index: &'i FamilyIndex<'a>,
    visible: &'i HashSet<PersonId>,
    collapsed: &'i HashSet<PersonId>,
    config: &'i LayoutConfig,
    /// Women drawn beside a visible husband instead of on their own.
    attached: HashSet<&'a str>,
    widths: HashMap<&'a str, f64>,
    in_progress: HashSet<&'a str>,
    x: HashMap<&'a str, f64>,
}

impl<'i, 'a> LayoutPass<'i, 'a> {
    fn new(
        index: &'i FamilyIndex<'a>,
        visible: &'i HashSet<PersonId>,
        collapsed: &'i HashSet<PersonId>,
        config: &'i LayoutConfig,
        shown: &[&'a Person],
    ) -> Self {
        let attached = shown
            .iter()
            .filter(|p| p.is_female())
            .filter(|p| {
                index.families_as_mother(&p.id).iter().any(|family| {
                    family
                        .father_id
                        .as_deref()
                        .is_some_and(|father| visible.contains(father))
                })
            })
            .map(|&p| p.id.as_str())
            .collect();

        Self {
            index,
            visible,
            collapsed,
            config,
            attached,
            widths: HashMap::new(),
            in_progress: HashSet::new(),
            x: HashMap::new(),
        }
    }

    fn is_root(&self, id: &str) -> bool {
        if self.attached.contains(id) {
            return false;
        }
        self.index
            .parent_family(id)
            .and_then(|family| family.father_id.as_deref())
            .is_none_or(|father| !self.visible.contains(father))
    }

    /// Visible wives in family order.
    fn wives(&self, id: &str) -> Vec<&'a str> {
        let mut wives: Vec<&'a str> = Vec::new();
        for &family in self.index.families_as_father(id) {
            let Some(mother) = family.mother_id.as_deref() else {
                continue;
            };
            if self.attached.contains(mother) && !wives.contains(&mother) {
                wives.push(mother);
            }
        }
        wives
    }

    fn children(&self, id: &str) -> Vec<&'a str> {
        if self.collapsed.contains(id) {
            return Vec::new();
        }
        self.index
            .children_as_father(id)
            .into_iter()
            .map(|link| link.person_id.as_str())
            .filter(|child| self.visible.contains(*child) && !self.attached.contains(child))
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn couple_width(&self, wife_count: usize) -> f64 {
        let card = self.config.card_width;
        card + wife_count as f64 * (self.config.couple_gap + card)
    }

    #[allow(clippy::cast_precision_loss)]
    fn row_width(&mut self, children: &[&'a str]) -> f64 {
        if children.is_empty() {
            return 0.0;
        }
        let sum: f64 = children.iter().map(|c| self.subtree_width(c)).sum();
        sum + (children.len() - 1) as f64 * self.config.sibling_gap
    }

    fn subtree_width(&mut self, id: &'a str) -> f64 {
        if let Some(&width) = self.widths.get(id) {
            return width;
        }
        if !self.in_progress.insert(id) {
            // Cyclic input; treat the repeat as a bare card.
            return self.config.card_width;
        }
        let couple = self.couple_width(self.wives(id).len());
        let children = self.children(id);
        let width = couple.max(self.row_width(&children));
        self.in_progress.remove(id);
        self.widths.insert(id, width);
        width
    }

    fn assign(&mut self, id: &'a str, start_x: f64) {
        if self.x.contains_key(id) {
            return;
        }
        let card = self.config.card_width;
        let gap = self.config.couple_gap;
        let center = start_x + self.subtree_width(id) / 2.0;
        let wives = self.wives(id);

        let father_x = center - self.couple_width(wives.len()) / 2.0;
        self.x.insert(id, father_x);
        let mut wife_x = father_x + card + gap;
        for wife in wives {
            self.x.entry(wife).or_insert(wife_x);
            wife_x += card + gap;
        }

        let children = self.children(id);
        let mut child_x = center - self.row_width(&children) / 2.0;
        for child in children {
            self.assign(child, child_x);
            child_x += self.subtree_width(child) + self.config.sibling_gap;
        }
    }
}
