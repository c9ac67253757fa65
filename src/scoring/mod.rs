pub mod registry;
pub mod rules;

mod errors;

pub use errors::ScoringError;
pub use registry::{PointsRuleRegistry, PointsRuleRegistryBuilder};
pub use rules::{OrderedListPointsRule, QuestionPointsRule, ScorePointsRule};

use tracing::warn;

use crate::kup::{GameMode, Kup, ScoringParameters};
use crate::prediction::{result_label, Prediction, PredictionKind, PredictionResult};

/// Converts a graded prediction into points for one game mode.
///
/// Implementations must be pure: the same graded prediction always yields
/// the same points. Malformed results count as zero.
pub trait PointsRule: Send + Sync {
    fn game_mode(&self) -> GameMode;

    fn points_for(&self, kup: &Kup, prediction: &Prediction, context: &ScoringContext) -> i32;
}

/// Auxiliary inputs available to points rules
pub struct ScoringContext<'a> {
    pub parameters: &'a ScoringParameters,
}

impl<'a> ScoringContext<'a> {
    pub fn new(parameters: &'a ScoringParameters) -> Self {
        Self { parameters }
    }

    pub fn for_kup(kup: &'a Kup) -> Self {
        Self::new(&kup.parameters)
    }
}

/// Counts data-integrity problems of a prediction scored under `game_mode`:
/// malformed results, or a prediction kind the mode cannot score.
pub fn integrity_issues(game_mode: &GameMode, prediction: &Prediction) -> usize {
    let wrong_kind = usize::from(prediction.kind.name() != game_mode.as_str());
    malformed_results(prediction) + wrong_kind
}

/// Results missing a label, position results without a position, and
/// positions pointing outside the predicted list
pub fn malformed_results(prediction: &Prediction) -> usize {
    prediction
        .results
        .iter()
        .filter(|result| is_malformed(prediction, result))
        .count()
}

fn is_malformed(prediction: &Prediction, result: &PredictionResult) -> bool {
    match result.label.as_deref() {
        None => true,
        Some(result_label::POSITION) => match (result.position, &prediction.kind) {
            (None, _) => true,
            (Some(position), PredictionKind::OrderedList { contestants, .. }) => {
                position == 0 || position as usize > contestants.len()
            }
            (Some(_), _) => false,
        },
        Some(_) => false,
    }
}

/// True when the prediction has to be scored as zero because one of its
/// results is malformed
pub(crate) fn scored_as_zero(kup: &Kup, prediction: &Prediction) -> bool {
    let malformed = malformed_results(prediction);
    if malformed > 0 {
        warn!(
            kup_id = %kup.id,
            prediction_id = %prediction.id,
            malformed,
            "Malformed results, prediction scored as zero"
        );
    }
    malformed > 0
}
