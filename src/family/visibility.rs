//! Which people are shown for a given view mode, focus, branch filter and
//! collapse set.

use std::collections::HashSet;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{index::FamilyIndex, model::PersonId};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Everyone, minus the subtrees of collapsed nodes.
    #[default]
    All,
    /// The focus person and every ancestor.
    Ancestors,
    /// The focus person, their partners and every descendant.
    Descendants,
}

impl ViewMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Ancestors => "ancestors",
            Self::Descendants => "descendants",
        }
    }
}

/// View selection. A branch root, when it names a known person, overrides
/// the mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub mode: ViewMode,
    pub focus: Option<PersonId>,
    pub branch_root: Option<PersonId>,
}

/// Compute the visible person ids. Unknown focus or branch ids fall back to
/// the "all" view.
pub fn resolve_visible(
    index: &FamilyIndex<'_>,
    filter: &ViewFilter,
    collapsed: &HashSet<PersonId>,
) -> HashSet<PersonId> {
    let branch_root = known(index, filter.branch_root.as_deref());
    let focus = known(index, filter.focus.as_deref());

    let visible = match (branch_root, filter.mode, focus) {
        (Some(root), _, _) => descendants_with_partners(index, root),
        (None, ViewMode::Ancestors, Some(focus)) => ancestors(index, focus),
        (None, ViewMode::Descendants, Some(focus)) => descendants_with_partners(index, focus),
        _ => all_except_collapsed(index, collapsed),
    };

    debug!(
        mode = filter.mode.label(),
        branch_root = ?filter.branch_root,
        focus = ?filter.focus,
        collapsed = collapsed.len(),
        visible = visible.len(),
        "Resolved visible people"
    );
    visible
}

fn known<'s>(index: &FamilyIndex<'_>, id: Option<&'s str>) -> Option<&'s str> {
    id.filter(|id| index.contains(id))
}

/// `start`, the co-parents of every family reached, and all descendants.
fn descendants_with_partners(index: &FamilyIndex<'_>, start: &str) -> HashSet<PersonId> {
    let mut visible = HashSet::new();
    let mut expanded: HashSet<&str> = HashSet::new();
    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        if !expanded.insert(id) {
            continue;
        }
        visible.insert(id.to_string());

        for family in index.families_of(id) {
            if let Some(partner) = family.partner_of(id).filter(|p| index.contains(p)) {
                visible.insert(partner.to_string());
            }
            stack.extend(
                index
                    .children_of(&family.id)
                    .iter()
                    .map(|link| link.person_id.as_str())
                    .filter(|child| index.contains(child)),
            );
        }
    }
    visible
}

/// `start` and the transitive closure of its parents.
fn ancestors(index: &FamilyIndex<'_>, start: &str) -> HashSet<PersonId> {
    let mut visible = HashSet::new();
    let mut stack = vec![start];

    while let Some(id) = stack.pop() {
        if !visible.insert(id.to_string()) {
            continue;
        }
        let Some(family) = index.parent_family(id) else {
            continue;
        };
        stack.extend(
            [family.father_id.as_deref(), family.mother_id.as_deref()]
                .into_iter()
                .flatten()
                .filter(|parent| index.contains(parent)),
        );
    }
    visible
}

fn all_except_collapsed(index: &FamilyIndex<'_>, collapsed: &HashSet<PersonId>) -> HashSet<PersonId> {
    let mut visible: HashSet<PersonId> = index.ids().map(str::to_string).collect();
    if collapsed.is_empty() {
        return visible;
    }

    for id in collapsed.iter().filter(|id| index.contains(id)) {
        hide_descendants(index, id, &mut visible);
    }

    visible
}

fn hide_descendants(index: &FamilyIndex<'_>, root: &str, visible: &mut HashSet<PersonId>) {
    let mut walked: HashSet<&str> = HashSet::from([root]);
    let mut stack: Vec<&str> = index
        .children_as_father(root)
        .iter()
        .map(|&link| link.person_id.as_str())
        .collect();

    while let Some(id) = stack.pop() {
        if !walked.insert(id) {
            continue;
        }
        visible.remove(id);
        stack.extend(
            index
                .children_as_father(id)
                .iter()
                .map(|&link| link.person_id.as_str()),
        );
    }
}
