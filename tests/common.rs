#![allow(dead_code)]

use genealogy_tui::family::{ChildLink, FamilyUnit, Gender, Person, TreeData};

/// Builds small tree snapshots for the integration tests.
#[derive(Default)]
pub struct TreeBuilder {
    data: TreeData,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn person(mut self, id: &str, gender: Gender, generation: u32, patrilineal: bool) -> Self {
        self.data.people.push(Person {
            id: id.to_string(),
            display_name: format!("Person {id}"),
            gender,
            generation,
            birth_year: None,
            death_year: None,
            is_living: true,
            is_patrilineal: patrilineal,
        });
        self
    }

    pub fn man(self, id: &str, generation: u32) -> Self {
        self.person(id, Gender::Male, generation, true)
    }

    pub fn woman(self, id: &str, generation: u32) -> Self {
        self.person(id, Gender::Female, generation, true)
    }

    /// A wife who joined the lineage by marriage.
    pub fn wife(self, id: &str, generation: u32) -> Self {
        self.person(id, Gender::Female, generation, false)
    }

    pub fn deceased(mut self, id: &str) -> Self {
        if let Some(person) = self.data.people.iter_mut().find(|p| p.id == id) {
            person.is_living = false;
        }
        self
    }

    pub fn family(mut self, id: &str, father: &str, mother: Option<&str>) -> Self {
        self.data.families.push(FamilyUnit {
            id: id.to_string(),
            father_id: Some(father.to_string()),
            mother_id: mother.map(str::to_string),
        });
        self
    }

    pub fn child(mut self, family: &str, person: &str) -> Self {
        let sort_order = i32::try_from(self.data.children.len()).unwrap_or(i32::MAX);
        self.data.children.push(ChildLink {
            family_id: family.to_string(),
            person_id: person.to_string(),
            sort_order,
        });
        self
    }

    pub fn build(self) -> TreeData {
        self.data
    }
}

/// Father `F` and mother `M` with `count` sons `C1..`.
pub fn couple_with_children(count: usize) -> TreeData {
    let mut builder = TreeBuilder::new()
        .man("F", 1)
        .wife("M", 1)
        .family("FM", "F", Some("M"));
    for i in 1..=count {
        let id = format!("C{i}");
        builder = builder.man(&id, 2).child("FM", &id);
    }
    builder.build()
}

/// Single-father line, each id the son of the previous one.
pub fn chain(ids: &[&str]) -> TreeData {
    let mut builder = TreeBuilder::new();
    for (i, id) in ids.iter().enumerate() {
        let generation = u32::try_from(i + 1).unwrap_or(u32::MAX);
        builder = builder.man(id, generation);
        if let Some(parent) = i.checked_sub(1).map(|p| ids[p]) {
            let family = format!("fam-{parent}");
            builder = builder.family(&family, parent, None).child(&family, id);
        }
    }
    builder.build()
}

/// Three generations: two brothers with wives, one of them with two wives,
/// and grandchildren on both sides.
pub fn three_generations() -> TreeData {
    TreeBuilder::new()
        .man("G", 1)
        .wife("GW", 1)
        .family("g", "G", Some("GW"))
        .man("S1", 2)
        .man("S2", 2)
        .woman("D1", 2)
        .child("g", "S1")
        .child("g", "S2")
        .child("g", "D1")
        .wife("S1W", 2)
        .wife("S2A", 2)
        .wife("S2B", 2)
        .family("s1", "S1", Some("S1W"))
        .family("s2a", "S2", Some("S2A"))
        .family("s2b", "S2", Some("S2B"))
        .man("T1", 3)
        .woman("T2", 3)
        .man("T3", 3)
        .man("T4", 3)
        .child("s1", "T1")
        .child("s1", "T2")
        .child("s2a", "T3")
        .child("s2b", "T4")
        .deceased("G")
        .build()
}
