use tracing::warn;

use super::super::{scored_as_zero, PointsRule, ScoringContext};
use crate::kup::{GameMode, Kup};
use crate::prediction::{result_label, Prediction, PredictionKind, ScoreMatch};

/// Exact score earns `exact_score`, the right winner or draw earns
/// `correct_outcome`.
pub struct ScorePointsRule;

impl Default for ScorePointsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl ScorePointsRule {
    pub fn new() -> Self {
        Self
    }
}

impl PointsRule for ScorePointsRule {
    fn game_mode(&self) -> GameMode {
        GameMode::score()
    }

    fn points_for(&self, kup: &Kup, prediction: &Prediction, context: &ScoringContext) -> i32 {
        if !matches!(prediction.kind, PredictionKind::Score { .. }) {
            warn!(
                kup_id = %kup.id,
                prediction_id = %prediction.id,
                kind = prediction.kind.name(),
                "Score rule given another prediction kind"
            );
            return 0;
        }

        if scored_as_zero(kup, prediction) {
            return 0;
        }

        let Some(result) = prediction
            .results
            .iter()
            .find(|r| r.is_labelled(result_label::SCORE))
        else {
            return 0;
        };

        match ScoreMatch::from_value(result.value) {
            ScoreMatch::Exact => context.parameters.exact_score,
            ScoreMatch::Outcome => context.parameters.correct_outcome,
            ScoreMatch::Miss => 0,
        }
    }
}
