use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString};

use super::errors::KupError;
use crate::sport::ScopeRef;

/// Identifiers of the built-in game modes
pub mod game_mode {
    pub const ORDERED_LIST: &str = "ordered_list";
    pub const SCORE: &str = "score";
    pub const QUESTION: &str = "question";
}

/// Scoring policy selector of a Kup.
///
/// Kept as an open identifier so that new modes only need a rule registered
/// under their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameMode(String);

impl GameMode {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn ordered_list() -> Self {
        Self::new(game_mode::ORDERED_LIST)
    }

    pub fn score() -> Self {
        Self::new(game_mode::SCORE)
    }

    pub fn question() -> Self {
        Self::new(game_mode::QUESTION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a Kup's scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KupState {
    /// Accepting predictions
    Open,
    /// Predictions frozen, scope started
    Locked,
    /// Results arriving, incremental updates running
    Grading,
    /// Scope complete, no further mutation
    Final,
}

impl KupState {
    pub fn can_transition_to(self, next: KupState) -> bool {
        matches!(
            (self, next),
            (KupState::Open, KupState::Locked)
                | (KupState::Locked, KupState::Grading)
                | (KupState::Locked, KupState::Final)
                | (KupState::Grading, KupState::Final)
                | (KupState::Final, KupState::Open)
        )
    }
}

/// Auxiliary scoring parameters read by points rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParameters {
    pub points_per_position: i32,
    /// Awarded once when every predicted position matched
    pub perfect_order_bonus: i32,
    pub exact_score: i32,
    pub correct_outcome: i32,
    pub correct_answer: i32,
}

impl Default for ScoringParameters {
    fn default() -> Self {
        Self {
            points_per_position: 10,
            perfect_order_bonus: 0,
            exact_score: 5,
            correct_outcome: 2,
            correct_answer: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kup {
    pub id: String,
    pub name: String,
    pub game_mode: GameMode,
    pub scope: ScopeRef,
    /// Participants in join order
    pub members: Vec<String>,
    pub state: KupState,
    #[serde(default)]
    pub parameters: ScoringParameters,
    pub created_at: DateTime<Utc>,
}

impl Kup {
    pub fn new(name: impl Into<String>, game_mode: GameMode, scope: ScopeRef) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            game_mode,
            scope,
            members: Vec::new(),
            state: KupState::Open,
            parameters: ScoringParameters::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_parameters(mut self, parameters: ScoringParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m == member_id)
    }

    /// Adds a member, returning false if already present
    pub fn add_member(&mut self, member_id: impl Into<String>) -> bool {
        let member_id = member_id.into();
        if self.has_member(&member_id) {
            return false;
        }
        self.members.push(member_id);
        true
    }

    pub fn remove_member(&mut self, member_id: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != member_id);
        self.members.len() != before
    }

    pub fn transition(&mut self, next: KupState) -> Result<(), KupError> {
        if !self.state.can_transition_to(next) {
            return Err(KupError::InvalidTransition {
                kup_id: self.id.clone(),
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Reopens a finished round-scoped Kup for predictions on the next round
    pub fn advance_scope(&mut self, next_scope: ScopeRef) -> Result<(), KupError> {
        if !self.scope.is_round() || !next_scope.is_round() {
            return Err(KupError::NotRoundScoped(self.id.clone()));
        }
        self.transition(KupState::Open)?;
        self.scope = next_scope;
        Ok(())
    }
}
