use std::collections::HashMap;
use std::sync::Arc;

use super::{
    rules::{OrderedListPointsRule, QuestionPointsRule, ScorePointsRule},
    PointsRule, ScoringContext, ScoringError,
};
use crate::kup::{GameMode, Kup};
use crate::prediction::Prediction;

/// Lookup from game mode to its points rule
pub struct PointsRuleRegistry {
    rules: HashMap<GameMode, Arc<dyn PointsRule>>,
}

impl PointsRuleRegistry {
    /// Builder preloaded with the built-in game modes
    pub fn builder() -> PointsRuleRegistryBuilder {
        PointsRuleRegistryBuilder::new()
            .with_rule(Arc::new(OrderedListPointsRule::new()))
            .with_rule(Arc::new(ScorePointsRule::new()))
            .with_rule(Arc::new(QuestionPointsRule::new()))
    }

    pub fn empty_builder() -> PointsRuleRegistryBuilder {
        PointsRuleRegistryBuilder::new()
    }

    pub fn rule_for(&self, game_mode: &GameMode) -> Result<Arc<dyn PointsRule>, ScoringError> {
        self.rules
            .get(game_mode)
            .cloned()
            .ok_or_else(|| ScoringError::RuleMissing(game_mode.clone()))
    }

    pub fn has_rule(&self, game_mode: &GameMode) -> bool {
        self.rules.contains_key(game_mode)
    }

    /// Points earned by `prediction` under the Kup's scoring policy
    pub fn points_for(
        &self,
        kup: &Kup,
        prediction: &Prediction,
        context: &ScoringContext,
    ) -> Result<i32, ScoringError> {
        let rule = self.rule_for(&kup.game_mode)?;
        Ok(rule.points_for(kup, prediction, context))
    }

    pub fn game_modes(&self) -> Vec<GameMode> {
        let mut modes: Vec<GameMode> = self.rules.keys().cloned().collect();
        modes.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        modes
    }
}

impl Default for PointsRuleRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub struct PointsRuleRegistryBuilder {
    rules: HashMap<GameMode, Arc<dyn PointsRule>>,
}

impl PointsRuleRegistryBuilder {
    fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers a rule under its game mode, replacing any previous one
    pub fn with_rule(mut self, rule: Arc<dyn PointsRule>) -> Self {
        self.rules.insert(rule.game_mode(), rule);
        self
    }

    pub fn without(mut self, game_mode: &GameMode) -> Self {
        self.rules.remove(game_mode);
        self
    }

    pub fn build(self) -> PointsRuleRegistry {
        PointsRuleRegistry { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::{PredictionKind, PredictionResult};
    use crate::sport::ScopeRef;

    struct PodiumRule;

    impl PointsRule for PodiumRule {
        fn game_mode(&self) -> GameMode {
            GameMode::new("podium")
        }

        fn points_for(&self, _kup: &Kup, prediction: &Prediction, _context: &ScoringContext) -> i32 {
            prediction.results.iter().map(|r| r.value).sum::<i32>() * 100
        }
    }

    fn question(kup: &Kup, hit: bool) -> Prediction {
        let mut prediction = Prediction::new(
            kup.id.clone(),
            "alice",
            ScopeRef::Game("g-1".into()),
            PredictionKind::Question {
                choices: vec!["a".into(), "b".into()],
                selected: "a".into(),
                games: vec![],
            },
        );
        prediction.record_results(vec![PredictionResult::question(hit)]);
        prediction
    }

    #[test]
    fn test_default_registry_covers_builtin_modes() {
        let registry = PointsRuleRegistry::default();
        assert_eq!(
            registry.game_modes(),
            vec![GameMode::ordered_list(), GameMode::question(), GameMode::score()]
        );
    }

    #[test]
    fn test_dispatches_by_game_mode() {
        let registry = PointsRuleRegistry::default();
        let kup = Kup::new("q", GameMode::question(), ScopeRef::Game("g-1".into()));
        let context = ScoringContext::for_kup(&kup);

        assert_eq!(registry.points_for(&kup, &question(&kup, true), &context).unwrap(), 3);
        assert_eq!(registry.points_for(&kup, &question(&kup, false), &context).unwrap(), 0);
    }

    #[test]
    fn test_missing_rule_is_reported() {
        let registry = PointsRuleRegistry::builder().without(&GameMode::question()).build();
        let kup = Kup::new("q", GameMode::question(), ScopeRef::Game("g-1".into()));

        let result = registry.points_for(&kup, &question(&kup, true), &ScoringContext::for_kup(&kup));
        assert!(matches!(result, Err(ScoringError::RuleMissing(mode)) if mode == GameMode::question()));
    }

    #[test]
    fn test_new_mode_registers_without_touching_dispatch() {
        let registry = PointsRuleRegistry::builder().with_rule(Arc::new(PodiumRule)).build();
        let kup = Kup::new("p", GameMode::new("podium"), ScopeRef::Game("g-1".into()));

        assert!(registry.has_rule(&GameMode::new("podium")));
        let points = registry
            .points_for(&kup, &question(&kup, true), &ScoringContext::for_kup(&kup))
            .unwrap();
        assert_eq!(points, 100);
    }

    #[test]
    fn test_empty_builder_has_no_rules() {
        let registry = PointsRuleRegistry::empty_builder().build();
        assert!(registry.game_modes().is_empty());
        assert!(registry.rule_for(&GameMode::score()).is_err());
    }
}
