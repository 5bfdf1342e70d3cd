//! Initial collapse sets for large trees.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    index::FamilyIndex,
    model::{PersonId, TreeData},
};

/// Collapse deep generations on load so very large trees open quickly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCollapse {
    pub enabled: bool,
    /// First generation that starts collapsed.
    pub generation: u32,
}

impl Default for AutoCollapse {
    fn default() -> Self {
        Self {
            enabled: true,
            generation: 8,
        }
    }
}

impl AutoCollapse {
    /// Fathers at or below the threshold generation, when the tree is
    /// deeper than the threshold. Empty otherwise.
    pub fn initial_collapsed(&self, data: &TreeData, index: &FamilyIndex<'_>) -> HashSet<PersonId> {
        if !self.enabled {
            return HashSet::new();
        }
        let Some(deepest) = data.max_generation() else {
            return HashSet::new();
        };
        if deepest <= self.generation {
            return HashSet::new();
        }

        let collapsed: HashSet<PersonId> = data
            .people
            .iter()
            .filter(|p| p.level() >= self.generation && index.fathers_children(&p.id))
            .map(|p| p.id.clone())
            .collect();
        info!(
            threshold = self.generation,
            deepest,
            collapsed = collapsed.len(),
            "Auto-collapsed deep generations"
        );
        collapsed
    }
}

/// Every person who fathers children.
pub fn collapse_all(data: &TreeData, index: &FamilyIndex<'_>) -> HashSet<PersonId> {
    data.people
        .iter()
        .filter(|p| index.fathers_children(&p.id))
        .map(|p| p.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::model::{ChildLink, FamilyUnit, Gender, Person};

    /// A straight male line of `depth` generations: P1 -> P2 -> ...
    fn chain(depth: u32) -> TreeData {
        let people = (1..=depth)
            .map(|g| Person {
                id: format!("P{g}"),
                display_name: format!("P{g}"),
                gender: Gender::Male,
                generation: g,
                birth_year: None,
                death_year: None,
                is_living: true,
                is_patrilineal: true,
            })
            .collect();
        let families = (1..depth)
            .map(|g| FamilyUnit {
                id: format!("f{g}"),
                father_id: Some(format!("P{g}")),
                mother_id: None,
            })
            .collect();
        let children = (1..depth)
            .map(|g| ChildLink {
                family_id: format!("f{g}"),
                person_id: format!("P{}", g + 1),
                sort_order: 0,
            })
            .collect();
        TreeData {
            people,
            families,
            children,
        }
    }

    #[test]
    fn test_shallow_tree_is_left_open() {
        let data = chain(8);
        let index = FamilyIndex::build(&data);
        assert!(AutoCollapse::default().initial_collapsed(&data, &index).is_empty());
    }

    #[test]
    fn test_deep_tree_collapses_fathers_at_threshold() {
        let data = chain(10);
        let index = FamilyIndex::build(&data);
        let collapsed = AutoCollapse::default().initial_collapsed(&data, &index);
        // P10 has no children, so only P8 and P9.
        assert_eq!(collapsed, HashSet::from(["P8".to_string(), "P9".to_string()]));
    }

    #[test]
    fn test_disabled_policy_collapses_nothing() {
        let data = chain(10);
        let index = FamilyIndex::build(&data);
        let policy = AutoCollapse {
            enabled: false,
            ..AutoCollapse::default()
        };
        assert!(policy.initial_collapsed(&data, &index).is_empty());
    }

    #[test]
    fn test_collapse_all_picks_every_father() {
        let data = chain(4);
        let index = FamilyIndex::build(&data);
        assert_eq!(collapse_all(&data, &index).len(), 3);
    }
}
