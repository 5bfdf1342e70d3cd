//! Relationship lookups built once per snapshot.

use std::collections::HashMap;

use tracing::debug;

use super::model::{ChildLink, FamilyUnit, Person, TreeData};

/// Borrowed lookup maps over a [`TreeData`] snapshot.
#[derive(Debug, Default)]
pub struct FamilyIndex<'a> {
    people: HashMap<&'a str, &'a Person>,
    by_father: HashMap<&'a str, Vec<&'a FamilyUnit>>,
    by_mother: HashMap<&'a str, Vec<&'a FamilyUnit>>,
    parent_family: HashMap<&'a str, &'a FamilyUnit>,
    /// Child links per family, ascending by sort order.
    children: HashMap<&'a str, Vec<&'a ChildLink>>,
}

impl<'a> FamilyIndex<'a> {
    pub fn build(data: &'a TreeData) -> Self {
        let people = data.people.iter().map(|p| (p.id.as_str(), p)).collect();
        let families: HashMap<&str, &FamilyUnit> =
            data.families.iter().map(|f| (f.id.as_str(), f)).collect();

        let (by_father, by_mother) = data.families.iter().fold(
            (HashMap::new(), HashMap::new()),
            |(mut fathers, mut mothers): (HashMap<_, Vec<_>>, HashMap<_, Vec<_>>), family| {
                if let Some(father) = family.father_id.as_deref() {
                    fathers.entry(father).or_default().push(family);
                }
                if let Some(mother) = family.mother_id.as_deref() {
                    mothers.entry(mother).or_default().push(family);
                }
                (fathers, mothers)
            },
        );

        let (parent_family, mut children) = data
            .children
            .iter()
            .filter_map(|link| {
                families
                    .get(link.family_id.as_str())
                    .map(|&family| (link, family))
            })
            .fold(
                (HashMap::new(), HashMap::new()),
                |(mut owners, mut links): (HashMap<_, _>, HashMap<_, Vec<_>>), (link, family)| {
                    owners.entry(link.person_id.as_str()).or_insert(family);
                    links.entry(family.id.as_str()).or_default().push(link);
                    (owners, links)
                },
            );

        for links in children.values_mut() {
            links.sort_by_key(|link| link.sort_order);
        }

        debug!(
            people = data.people.len(),
            fathers = by_father.len(),
            mothers = by_mother.len(),
            linked_children = parent_family.len(),
            "Built family index"
        );

        Self {
            people,
            by_father,
            by_mother,
            parent_family,
            children,
        }
    }

    pub fn person(&self, id: &str) -> Option<&'a Person> {
        self.people.get(id).copied()
    }

    /// Every person id in the snapshot, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.people.keys().copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.people.contains_key(id)
    }

    /// Families where `id` is the father.
    pub fn families_as_father(&self, id: &str) -> &[&'a FamilyUnit] {
        self.by_father.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Families where `id` is the mother.
    pub fn families_as_mother(&self, id: &str) -> &[&'a FamilyUnit] {
        self.by_mother.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Families where `id` is either parent, fathered ones first.
    pub fn families_of(&self, id: &str) -> impl Iterator<Item = &'a FamilyUnit> + '_ {
        self.families_as_father(id)
            .iter()
            .chain(self.families_as_mother(id))
            .copied()
    }

    /// The family `id` was born into.
    pub fn parent_family(&self, id: &str) -> Option<&'a FamilyUnit> {
        self.parent_family.get(id).copied()
    }

    /// Child links of a family, ascending by sort order.
    pub fn children_of(&self, family_id: &str) -> &[&'a ChildLink] {
        self.children.get(family_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `id` fathers at least one child.
    pub fn fathers_children(&self, id: &str) -> bool {
        self.families_as_father(id).iter().any(|family| {
            self.children_of(&family.id).iter().any(|link| {
                self.parent_family(&link.person_id)
                    .is_some_and(|owner| owner.id == family.id)
            })
        })
    }

    /// Children of every family `id` fathers, each child listed once and only
    /// under the family that owns it.
    pub fn children_as_father(&self, id: &str) -> Vec<&'a ChildLink> {
        let mut links: Vec<&ChildLink> = Vec::new();
        for family in self.families_as_father(id) {
            for &link in self.children_of(&family.id) {
                let owned = self
                    .parent_family(&link.person_id)
                    .is_some_and(|owner| owner.id == family.id);
                if owned && !links.iter().any(|l| l.person_id == link.person_id) {
                    links.push(link);
                }
            }
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::model::Gender;

    fn person(id: &str, gender: Gender) -> Person {
        Person {
            id: id.to_string(),
            display_name: id.to_uppercase(),
            gender,
            generation: 1,
            birth_year: None,
            death_year: None,
            is_living: true,
            is_patrilineal: true,
        }
    }

    fn family(id: &str, father: Option<&str>, mother: Option<&str>) -> FamilyUnit {
        FamilyUnit {
            id: id.to_string(),
            father_id: father.map(str::to_string),
            mother_id: mother.map(str::to_string),
        }
    }

    fn link(family: &str, child: &str, order: i32) -> ChildLink {
        ChildLink {
            family_id: family.to_string(),
            person_id: child.to_string(),
            sort_order: order,
        }
    }

    #[test]
    fn test_maps_parents_and_children() {
        let data = TreeData {
            people: vec![
                person("f", Gender::Male),
                person("m", Gender::Female),
                person("a", Gender::Male),
                person("b", Gender::Female),
            ],
            families: vec![family("fam", Some("f"), Some("m"))],
            children: vec![link("fam", "b", 2), link("fam", "a", 1)],
        };
        let index = FamilyIndex::build(&data);

        assert_eq!(index.families_as_father("f").len(), 1);
        assert_eq!(index.families_as_mother("m").len(), 1);
        assert_eq!(index.parent_family("a").map(|f| f.id.as_str()), Some("fam"));
        let order: Vec<&str> = index
            .children_of("fam")
            .iter()
            .map(|l| l.person_id.as_str())
            .collect();
        assert_eq!(order, ["a", "b"]);
        assert!(index.fathers_children("f"));
        assert!(!index.fathers_children("m"));
    }

    #[test]
    fn test_dangling_child_links_are_ignored() {
        let data = TreeData {
            people: vec![person("a", Gender::Male)],
            families: vec![],
            children: vec![link("missing", "a", 0)],
        };
        let index = FamilyIndex::build(&data);
        assert!(index.parent_family("a").is_none());
        assert!(index.children_of("missing").is_empty());
    }

    #[test]
    fn test_first_owning_family_wins() {
        let data = TreeData {
            people: vec![
                person("f1", Gender::Male),
                person("f2", Gender::Male),
                person("c", Gender::Male),
            ],
            families: vec![
                family("one", Some("f1"), None),
                family("two", Some("f2"), None),
            ],
            children: vec![link("one", "c", 0), link("two", "c", 0)],
        };
        let index = FamilyIndex::build(&data);
        assert_eq!(index.parent_family("c").map(|f| f.id.as_str()), Some("one"));
        assert_eq!(index.children_as_father("f1").len(), 1);
        assert!(index.children_as_father("f2").is_empty());
    }

    #[test]
    fn test_remarriage_merges_children_per_father() {
        let data = TreeData {
            people: vec![
                person("f", Gender::Male),
                person("w1", Gender::Female),
                person("w2", Gender::Female),
                person("a", Gender::Male),
                person("b", Gender::Male),
            ],
            families: vec![
                family("first", Some("f"), Some("w1")),
                family("second", Some("f"), Some("w2")),
            ],
            children: vec![link("second", "b", 0), link("first", "a", 0)],
        };
        let index = FamilyIndex::build(&data);
        let kids: Vec<&str> = index
            .children_as_father("f")
            .iter()
            .map(|l| l.person_id.as_str())
            .collect();
        assert_eq!(kids, ["a", "b"]);
        assert_eq!(index.families_of("f").count(), 2);
    }
}
