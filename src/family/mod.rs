//! Family-tree model and the pure pipeline that turns a snapshot into
//! positioned cards and connection lines.

mod collapse;
mod connections;
mod index;
mod layout;
mod model;
mod summary;
mod visibility;

use std::collections::{HashMap, HashSet};

use serde::Serialize;

pub use collapse::{collapse_all, AutoCollapse};
pub use connections::{route_connections, ConnectionSegment, SegmentKind, BUS_RATIO};
pub use index::FamilyIndex;
pub use layout::{
    generation_headers, layout_tree, GenerationHeader, LayoutConfig, LayoutNode, TreeLayout,
};
pub use model::{
    ChildLink, FamilyId, FamilyUnit, Gender, Person, PersonId, TreeData, MAX_SEARCH_RESULTS,
    MIN_SEARCH_LEN,
};
pub use summary::{summarize, summarize_all, BranchSummary};
pub use visibility::{resolve_visible, ViewFilter, ViewMode};

/// Placed cards plus the lines between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub connections: Vec<ConnectionSegment>,
    pub width: f64,
    pub height: f64,
    pub x_offset: f64,
}

impl LayoutResult {
    pub fn find_node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.person.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Everything a renderer needs for one frame of the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeView {
    #[serde(flatten)]
    pub layout: LayoutResult,
    /// Keyed by collapsed person id.
    pub summaries: HashMap<PersonId, BranchSummary>,
    pub headers: Vec<GenerationHeader>,
}

/// Run index, visibility, layout, routing and summaries over one snapshot.
pub fn build_tree_view(
    data: &TreeData,
    filter: &ViewFilter,
    collapsed: &HashSet<PersonId>,
    config: &LayoutConfig,
) -> TreeView {
    let index = FamilyIndex::build(data);
    let visible = resolve_visible(&index, filter, collapsed);
    let placed = layout_tree(&data.people, &index, &visible, collapsed, config);
    let connections = route_connections(&data.families, &index, &placed, collapsed, config);
    let headers = generation_headers(&placed.nodes);

    TreeView {
        layout: LayoutResult {
            nodes: placed.nodes,
            connections,
            width: placed.width,
            height: placed.height,
            x_offset: placed.x_offset,
        },
        summaries: summarize_all(&index, collapsed),
        headers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: &str, gender: Gender, generation: u32) -> Person {
        Person {
            id: id.to_string(),
            display_name: id.to_string(),
            gender,
            generation,
            birth_year: None,
            death_year: None,
            is_living: true,
            is_patrilineal: true,
        }
    }

    #[test]
    fn test_tree_view_bundles_every_stage() {
        let data = TreeData {
            people: vec![
                person("F", Gender::Male, 1),
                person("M", Gender::Female, 1),
                person("A", Gender::Male, 2),
            ],
            families: vec![FamilyUnit {
                id: "fm".into(),
                father_id: Some("F".into()),
                mother_id: Some("M".into()),
            }],
            children: vec![ChildLink {
                family_id: "fm".into(),
                person_id: "A".into(),
                sort_order: 0,
            }],
        };

        let config = LayoutConfig::default();
        let open = build_tree_view(&data, &ViewFilter::default(), &HashSet::new(), &config);
        assert_eq!(open.layout.nodes.len(), 3);
        assert_eq!(open.layout.connections.len(), 2);
        assert_eq!(open.headers.len(), 2);
        assert!(open.summaries.is_empty());

        let collapsed = HashSet::from(["F".to_string()]);
        let closed = build_tree_view(&data, &ViewFilter::default(), &collapsed, &config);
        assert_eq!(closed.layout.nodes.len(), 2);
        assert_eq!(closed.summaries["F"].total_count, 1);
    }

    #[test]
    fn test_empty_snapshot_gives_empty_view() {
        let view = build_tree_view(
            &TreeData::default(),
            &ViewFilter::default(),
            &HashSet::new(),
            &LayoutConfig::default(),
        );
        assert!(view.layout.is_empty());
        assert!(view.layout.connections.is_empty());
        assert!(view.layout.width.abs() < f64::EPSILON);
    }
}
