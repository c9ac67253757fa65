use tracing::warn;

use super::super::{scored_as_zero, PointsRule, ScoringContext};
use crate::kup::{GameMode, Kup};
use crate::prediction::{result_label, Prediction, PredictionKind};

pub struct QuestionPointsRule;

impl Default for QuestionPointsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionPointsRule {
    pub fn new() -> Self {
        Self
    }
}

impl PointsRule for QuestionPointsRule {
    fn game_mode(&self) -> GameMode {
        GameMode::question()
    }

    fn points_for(&self, kup: &Kup, prediction: &Prediction, context: &ScoringContext) -> i32 {
        if !matches!(prediction.kind, PredictionKind::Question { .. }) {
            warn!(
                kup_id = %kup.id,
                prediction_id = %prediction.id,
                kind = prediction.kind.name(),
                "Question rule given another prediction kind"
            );
            return 0;
        }
        if scored_as_zero(kup, prediction) {
            return 0;
        }

        let answered = prediction
            .results
            .iter()
            .any(|r| r.is_labelled(result_label::QUESTION) && r.value > 0);

        if answered {
            context.parameters.correct_answer
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kup::ScoringParameters;
    use crate::prediction::PredictionResult;
    use crate::sport::ScopeRef;

    fn question(results: Vec<PredictionResult>) -> Prediction {
        let mut prediction = Prediction::new(
            "kup",
            "alice",
            ScopeRef::Game("g-1".into()),
            PredictionKind::Question {
                choices: vec!["yes".into(), "no".into()],
                selected: "yes".into(),
                games: vec![],
            },
        );
        prediction.results = results;
        prediction
    }

    #[test]
    fn test_default_rule_serves_question_mode() {
        assert_eq!(QuestionPointsRule::default().game_mode(), GameMode::question());
    }

    #[test]
    fn test_correct_answer_uses_kup_parameter() {
        let kup = Kup::new("q", GameMode::question(), ScopeRef::Game("g-1".into())).with_parameters(
            ScoringParameters {
                correct_answer: 4,
                ..ScoringParameters::default()
            },
        );
        let rule = QuestionPointsRule::new();
        let context = ScoringContext::for_kup(&kup);

        assert_eq!(rule.points_for(&kup, &question(vec![PredictionResult::question(true)]), &context), 4);
        assert_eq!(rule.points_for(&kup, &question(vec![PredictionResult::question(false)]), &context), 0);
        assert_eq!(rule.points_for(&kup, &question(vec![]), &context), 0);
    }

    #[test]
    fn test_unlabelled_result_zeroes_correct_answer() {
        let kup = Kup::new("q", GameMode::question(), ScopeRef::Game("g-1".into()));
        let prediction = question(vec![
            PredictionResult::question(true),
            PredictionResult {
                label: None,
                position: None,
                value: 1,
            },
        ]);

        let points = QuestionPointsRule::new().points_for(&kup, &prediction, &ScoringContext::for_kup(&kup));
        assert_eq!(points, 0);
    }
}
