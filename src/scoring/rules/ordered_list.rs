use tracing::warn;

use super::super::{scored_as_zero, PointsRule, ScoringContext};
use crate::kup::{GameMode, Kup};
use crate::prediction::{result_label, Prediction, PredictionKind};

/// Awards `points_per_position` for every exactly predicted position, plus
/// `perfect_order_bonus` when the whole list matched.
pub struct OrderedListPointsRule;

impl Default for OrderedListPointsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderedListPointsRule {
    pub fn new() -> Self {
        Self
    }
}

impl PointsRule for OrderedListPointsRule {
    fn game_mode(&self) -> GameMode {
        GameMode::ordered_list()
    }

    fn points_for(&self, kup: &Kup, prediction: &Prediction, context: &ScoringContext) -> i32 {
        let PredictionKind::OrderedList { contestants, .. } = &prediction.kind else {
            warn!(
                kup_id = %kup.id,
                prediction_id = %prediction.id,
                kind = prediction.kind.name(),
                "Ordered-list rule given another prediction kind"
            );
            return 0;
        };

        if scored_as_zero(kup, prediction) {
            return 0;
        }

        let matched = prediction
            .results
            .iter()
            .filter(|r| r.is_labelled(result_label::POSITION) && r.value > 0)
            .count();

        let bonus = if matched > 0 && matched == contestants.len() {
            context.parameters.perfect_order_bonus
        } else {
            0
        };

        matched as i32 * context.parameters.points_per_position + bonus
    }
}
