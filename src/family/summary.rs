//! Descendant statistics shown on collapsed cards.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{index::FamilyIndex, model::PersonId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BranchSummary {
    pub total_count: usize,
    pub living_count: usize,
    /// Zero when the branch is empty.
    pub min_generation: u32,
    pub max_generation: u32,
}

impl BranchSummary {
    pub const fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Badge text such as `+5 (3 living)`.
    pub fn badge(&self) -> String {
        format!("+{} ({} living)", self.total_count, self.living_count)
    }

    /// Generation span such as `G3-G5`, if the branch has any members.
    pub fn generation_span(&self) -> Option<String> {
        match (self.min_generation, self.max_generation) {
            (0, _) => None,
            (min, max) if min == max => Some(format!("G{min}")),
            (min, max) => Some(format!("G{min}-G{max}")),
        }
    }
}

/// Count everyone below `id`, excluding `id` itself.
pub fn summarize(index: &FamilyIndex<'_>, id: &str) -> BranchSummary {
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut stack: Vec<&str> = index
        .children_as_father(id)
        .iter()
        .map(|&link| link.person_id.as_str())
        .collect();
    let mut summary = BranchSummary::default();

    while let Some(child) = stack.pop() {
        if !seen.insert(child) {
            continue;
        }
        let Some(person) = index.person(child) else {
            continue;
        };

        let generation = person.level();
        summary.total_count += 1;
        if person.is_living {
            summary.living_count += 1;
        }
        summary.min_generation = if summary.min_generation == 0 {
            generation
        } else {
            summary.min_generation.min(generation)
        };
        summary.max_generation = summary.max_generation.max(generation);

        stack.extend(
            index
                .children_as_father(child)
                .iter()
                .map(|&link| link.person_id.as_str()),
        );
    }
    summary
}

/// Summaries for every collapsed person the index knows.
pub fn summarize_all(
    index: &FamilyIndex<'_>,
    collapsed: &HashSet<PersonId>,
) -> HashMap<PersonId, BranchSummary> {
    collapsed
        .iter()
        .filter(|id| index.contains(id))
        .map(|id| (id.clone(), summarize(index, id)))
        .collect()
}
