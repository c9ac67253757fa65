use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sport::{Contestant, ScopeRef};

/// Labels carried by graded results
pub mod result_label {
    /// One result per predicted position of an ordered list
    pub const POSITION: &str = "position";
    pub const SCORE: &str = "score";
    pub const QUESTION: &str = "question";
}

/// Kind-specific payload of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredictionKind {
    /// Insertion order is the predicted ranking
    OrderedList {
        contestants: Vec<Contestant>,
        drawn: bool,
    },
    Score {
        home: u32,
        away: u32,
    },
    Question {
        choices: Vec<String>,
        selected: String,
        /// Additional games the answer depends on
        #[serde(default)]
        games: Vec<String>,
    },
}

impl PredictionKind {
    pub fn name(&self) -> &'static str {
        match self {
            PredictionKind::OrderedList { .. } => "ordered_list",
            PredictionKind::Score { .. } => "score",
            PredictionKind::Question { .. } => "question",
        }
    }
}

/// How a score prediction compares to the final score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreMatch {
    Exact,
    Outcome,
    Miss,
}

impl ScoreMatch {
    pub fn as_value(self) -> i32 {
        match self {
            ScoreMatch::Exact => 2,
            ScoreMatch::Outcome => 1,
            ScoreMatch::Miss => 0,
        }
    }

    pub fn from_value(value: i32) -> Self {
        match value {
            2 => ScoreMatch::Exact,
            1 => ScoreMatch::Outcome,
            _ => ScoreMatch::Miss,
        }
    }
}

/// A graded fact comparing a prediction to the final outcome.
///
/// `label` is optional only because stored results can be incomplete; such
/// results score zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Option<String>,
    /// 1-based position for ordered-list results
    pub position: Option<u32>,
    pub value: i32,
}

impl PredictionResult {
    pub fn position(position: u32, matched: bool) -> Self {
        Self {
            label: Some(result_label::POSITION.to_string()),
            position: Some(position),
            value: i32::from(matched),
        }
    }

    pub fn score(score_match: ScoreMatch) -> Self {
        Self {
            label: Some(result_label::SCORE.to_string()),
            position: None,
            value: score_match.as_value(),
        }
    }

    pub fn question(matched: bool) -> Self {
        Self {
            label: Some(result_label::QUESTION.to_string()),
            position: None,
            value: i32::from(matched),
        }
    }

    pub fn is_labelled(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }

    fn key(&self) -> (Option<&str>, Option<u32>) {
        (self.label.as_deref(), self.position)
    }
}

/// Official outcome of a finalized scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Ranking {
        contestants: Vec<Contestant>,
        /// Tie at the top of the final order
        drawn: bool,
    },
    Score {
        home: u32,
        away: u32,
    },
    Answer {
        choice: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub kup_id: String,
    pub member_id: String,
    pub scope: ScopeRef,
    pub kind: PredictionKind,
    #[serde(default)]
    pub results: Vec<PredictionResult>,
    pub submitted_at: DateTime<Utc>,
    /// When the stored results last changed
    #[serde(default)]
    pub graded_at: Option<DateTime<Utc>>,
}

impl Prediction {
    pub fn new(
        kup_id: impl Into<String>,
        member_id: impl Into<String>,
        scope: ScopeRef,
        kind: PredictionKind,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kup_id: kup_id.into(),
            member_id: member_id.into(),
            scope,
            kind,
            results: Vec::new(),
            submitted_at: Utc::now(),
            graded_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_graded(&self) -> bool {
        !self.results.is_empty()
    }

    /// Whether finalizing `scope` affects this prediction
    pub fn covers(&self, scope: &ScopeRef) -> bool {
        if &self.scope == scope {
            return true;
        }
        match (&self.kind, scope) {
            (PredictionKind::Question { games, .. }, ScopeRef::Game(game_id)) => {
                games.iter().any(|g| g == game_id)
            }
            _ => false,
        }
    }

    /// Stores graded results, replacing any result with the same label and
    /// position. Returns true when the stored results changed.
    pub fn record_results(&mut self, results: Vec<PredictionResult>) -> bool {
        let mut changed = false;
        for result in results {
            match self.results.iter_mut().find(|r| r.key() == result.key()) {
                Some(existing) if *existing == result => {}
                Some(existing) => {
                    *existing = result;
                    changed = true;
                }
                None => {
                    self.results.push(result);
                    changed = true;
                }
            }
        }
        changed
    }

    /// Records freshly graded results and stamps `graded_at` when they changed
    pub fn apply_grading(&mut self, results: Vec<PredictionResult>) -> bool {
        let changed = self.record_results(results);
        if changed {
            self.graded_at = Some(Utc::now());
        }
        changed
    }
}
