//! Snapshot types supplied by the data layer.

use std::{fs, path::Path, result::Result as StdResult};

use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::error::Result;

pub type PersonId = String;
pub type FamilyId = String;

/// Minimum query length before a name search returns anything.
pub const MIN_SEARCH_LEN: usize = 2;
/// Maximum number of name search results.
pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Accepts `"male"`/`"female"` as well as the numeric codes `1`/`2`.
impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> StdResult<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Code(u8),
            Name(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Code(1) => Ok(Self::Male),
            Repr::Code(2) => Ok(Self::Female),
            Repr::Name(name) if name.eq_ignore_ascii_case("male") => Ok(Self::Male),
            Repr::Name(name) if name.eq_ignore_ascii_case("female") => Ok(Self::Female),
            Repr::Code(code) => Err(serde::de::Error::custom(format!(
                "unknown gender code {code}"
            ))),
            Repr::Name(name) => Err(serde::de::Error::custom(format!(
                "unknown gender `{name}`"
            ))),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_generation() -> u32 {
    1
}

/// A person in the tree. Never mutated by the layout code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub display_name: String,
    pub gender: Gender,
    #[serde(default = "default_generation")]
    pub generation: u32,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
    #[serde(default = "default_true")]
    pub is_living: bool,
    /// False for people who joined the lineage by marriage or adoption.
    #[serde(default = "default_true")]
    pub is_patrilineal: bool,
}

impl Person {
    /// Generation number, with missing or zero values read as the first generation.
    pub const fn level(&self) -> u32 {
        if self.generation == 0 {
            1
        } else {
            self.generation
        }
    }

    pub fn is_female(&self) -> bool {
        self.gender == Gender::Female
    }

    /// Up to two uppercase initials taken from the last two name words.
    pub fn initials(&self) -> String {
        let firsts: Vec<char> = self
            .display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect();
        let start = firsts.len().saturating_sub(2);
        firsts[start..].iter().flat_map(|c| c.to_uppercase()).collect()
    }

    /// Short year span shown on a card, if any year is known.
    pub fn card_years(&self) -> Option<String> {
        match (self.birth_year, self.death_year) {
            (Some(b), Some(d)) => Some(format!("{b} - {d}")),
            (Some(b), None) => Some(format!("{b} -")),
            (None, Some(d)) => Some(format!("? - {d}")),
            (None, None) => None,
        }
    }

    /// Longer status line used in detail popups.
    pub fn status_text(&self) -> String {
        match (self.birth_year, self.death_year) {
            (Some(b), Some(d)) => format!("{b} - {d}"),
            (Some(b), None) if self.is_living => format!("{b} - now"),
            (Some(b), None) => format!("{b} - ?"),
            (None, Some(d)) => format!("? - {d}"),
            (None, None) if self.is_living => "Living".to_string(),
            (None, None) => "Deceased".to_string(),
        }
    }
}

/// One partnership and the children it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyUnit {
    pub id: FamilyId,
    #[serde(default)]
    pub father_id: Option<PersonId>,
    #[serde(default)]
    pub mother_id: Option<PersonId>,
}

impl FamilyUnit {
    /// The other parent of this family, seen from `person_id`.
    pub fn partner_of(&self, person_id: &str) -> Option<&str> {
        match (self.father_id.as_deref(), self.mother_id.as_deref()) {
            (Some(f), Some(m)) if f == person_id => Some(m),
            (Some(f), Some(m)) if m == person_id => Some(f),
            _ => None,
        }
    }
}

/// Descent edge from a family to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildLink {
    pub family_id: FamilyId,
    pub person_id: PersonId,
    #[serde(default)]
    pub sort_order: i32,
}

/// Read-only snapshot of everything the tree needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeData {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub families: Vec<FamilyUnit>,
    #[serde(default)]
    pub children: Vec<ChildLink>,
}

impl TreeData {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let data = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            people = data.people.len(),
            families = data.families.len(),
            children = data.children.len(),
            "Loaded tree snapshot"
        );
        Ok(data)
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn max_generation(&self) -> Option<u32> {
        self.people.iter().map(Person::level).max()
    }

    /// Case-insensitive substring search over display names.
    pub fn search(&self, query: &str) -> Vec<&Person> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Vec::new();
        }
        self.people
            .iter()
            .filter(|p| p.display_name.to_lowercase().contains(&query))
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }
}
