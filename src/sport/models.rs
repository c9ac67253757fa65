use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use strum_macros::{Display, EnumString};

/// Whether a contestant is a single athlete or a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestantType {
    Individual,
    Team,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Country {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            properties: HashMap::new(),
        }
    }
}

impl PartialEq for Country {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Country {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contestant {
    pub id: String,
    pub name: String,
    pub contestant_type: ContestantType,
    pub country: Option<Country>,
    /// Free-form attributes, the only mutable part of a contestant
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Contestant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, contestant_type: ContestantType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            contestant_type,
            country: None,
            properties: HashMap::new(),
        }
    }

    pub fn with_country(mut self, country: Country) -> Self {
        self.country = Some(country);
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Identity rule used for membership and deduplication.
    ///
    /// Two contestants are the same entity when name and type match. The id,
    /// country and property bag do not take part in the comparison.
    pub fn same_entity(&self, other: &Contestant) -> bool {
        self.name == other.name && self.contestant_type == other.contestant_type
    }
}

impl PartialEq for Contestant {
    fn eq(&self, other: &Self) -> bool {
        self.same_entity(other)
    }
}

impl Eq for Contestant {}

impl std::hash::Hash for Contestant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.contestant_type.hash(state);
    }
}

/// Reference to the tournament unit a prediction or Kup is made against
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ScopeRef {
    Season(String),
    Stage(String),
    Round(String),
    Game(String),
}

impl ScopeRef {
    pub fn id(&self) -> &str {
        match self {
            ScopeRef::Season(id) => id,
            ScopeRef::Stage(id) => id,
            ScopeRef::Round(id) => id,
            ScopeRef::Game(id) => id,
        }
    }

    pub fn is_round(&self) -> bool {
        matches!(self, ScopeRef::Round(_))
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ScopeRef::Season(_) => "season",
            ScopeRef::Stage(_) => "stage",
            ScopeRef::Round(_) => "round",
            ScopeRef::Game(_) => "game",
        };
        write!(f, "{}:{}", kind, self.id())
    }
}
