use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::Prediction;
use crate::shared::AppError;
use crate::sport::ScopeRef;

/// Trait for prediction storage operations
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Inserts or replaces a prediction by id
    async fn save_prediction(&self, prediction: &Prediction) -> Result<(), AppError>;
    async fn get_prediction(&self, prediction_id: &str) -> Result<Option<Prediction>, AppError>;
    async fn predictions_for_member(
        &self,
        kup_id: &str,
        member_id: &str,
    ) -> Result<Vec<Prediction>, AppError>;
    async fn predictions_for_kup(&self, kup_id: &str) -> Result<Vec<Prediction>, AppError>;
    /// Predictions affected when `scope` is finalized
    async fn predictions_for_scope(&self, scope: &ScopeRef) -> Result<Vec<Prediction>, AppError>;
    /// Most recent `graded_at` across the Kup's predictions
    async fn last_graded_at(&self, kup_id: &str) -> Result<Option<DateTime<Utc>>, AppError>;
}

/// In-memory implementation of PredictionRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryPredictionRepository {
    predictions: RwLock<HashMap<String, Prediction>>,
}

impl InMemoryPredictionRepository {
    pub fn new() -> Self {
        Self {
            predictions: RwLock::new(HashMap::new()),
        }
    }

    async fn filtered(&self, keep: impl Fn(&Prediction) -> bool) -> Vec<Prediction> {
        let predictions = self.predictions.read().await;
        let mut matching: Vec<Prediction> = predictions.values().filter(|p| keep(*p)).cloned().collect();
        matching.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)));
        matching
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    #[instrument(skip(self, prediction), fields(prediction_id = %prediction.id))]
    async fn save_prediction(&self, prediction: &Prediction) -> Result<(), AppError> {
        debug!(kup_id = %prediction.kup_id, "Saving prediction in memory");
        let mut predictions = self.predictions.write().await;
        predictions.insert(prediction.id.clone(), prediction.clone());
        Ok(())
    }

    async fn get_prediction(&self, prediction_id: &str) -> Result<Option<Prediction>, AppError> {
        let predictions = self.predictions.read().await;
        Ok(predictions.get(prediction_id).cloned())
    }

    async fn predictions_for_member(
        &self,
        kup_id: &str,
        member_id: &str,
    ) -> Result<Vec<Prediction>, AppError> {
        Ok(self
            .filtered(|p| p.kup_id == kup_id && p.member_id == member_id)
            .await)
    }

    async fn predictions_for_kup(&self, kup_id: &str) -> Result<Vec<Prediction>, AppError> {
        Ok(self.filtered(|p| p.kup_id == kup_id).await)
    }

    async fn predictions_for_scope(&self, scope: &ScopeRef) -> Result<Vec<Prediction>, AppError> {
        Ok(self.filtered(|p| p.covers(scope)).await)
    }

    async fn last_graded_at(&self, kup_id: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        let predictions = self.predictions.read().await;
        Ok(predictions
            .values()
            .filter(|p| p.kup_id == kup_id)
            .filter_map(|p| p.graded_at)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::models::PredictionKind;

    fn score(kup: &str, member: &str, game: &str) -> Prediction {
        Prediction::new(
            kup,
            member,
            ScopeRef::Game(game.into()),
            PredictionKind::Score { home: 1, away: 0 },
        )
    }

    #[tokio::test]
    async fn test_save_and_get_prediction() {
        let repo = InMemoryPredictionRepository::new();
        let prediction = score("kup", "alice", "g-1");

        repo.save_prediction(&prediction).await.unwrap();

        let loaded = repo.get_prediction(&prediction.id).await.unwrap().unwrap();
        assert_eq!(loaded.member_id, "alice");
        assert!(repo.get_prediction("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let repo = InMemoryPredictionRepository::new();
        let mut prediction = score("kup", "alice", "g-1");
        repo.save_prediction(&prediction).await.unwrap();

        prediction.kind = PredictionKind::Score { home: 4, away: 4 };
        repo.save_prediction(&prediction).await.unwrap();

        assert_eq!(repo.predictions_for_kup("kup").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_queries_filter_by_member_kup_and_scope() {
        let repo = InMemoryPredictionRepository::new();
        repo.save_prediction(&score("kup-1", "alice", "g-1")).await.unwrap();
        repo.save_prediction(&score("kup-1", "alice", "g-2")).await.unwrap();
        repo.save_prediction(&score("kup-1", "bob", "g-1")).await.unwrap();
        repo.save_prediction(&score("kup-2", "alice", "g-1")).await.unwrap();

        assert_eq!(repo.predictions_for_member("kup-1", "alice").await.unwrap().len(), 2);
        assert_eq!(repo.predictions_for_kup("kup-1").await.unwrap().len(), 3);
        assert_eq!(
            repo.predictions_for_scope(&ScopeRef::Game("g-1".into()))
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_last_graded_at_tracks_latest_grading() {
        let repo = InMemoryPredictionRepository::new();
        let mut first = score("kup", "alice", "g-1");
        let second = score("kup", "bob", "g-1");
        repo.save_prediction(&first).await.unwrap();
        repo.save_prediction(&second).await.unwrap();

        assert!(repo.last_graded_at("kup").await.unwrap().is_none());

        first.apply_grading(vec![crate::prediction::PredictionResult::score(
            crate::prediction::ScoreMatch::Exact,
        )]);
        repo.save_prediction(&first).await.unwrap();

        assert_eq!(repo.last_graded_at("kup").await.unwrap(), first.graded_at);
        assert!(repo.last_graded_at("other").await.unwrap().is_none());
    }
}
