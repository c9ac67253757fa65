use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kupscore::{
    prediction::{InMemoryPredictionRepository, PredictionRepository},
    shared::AppError,
    Prediction, ScopeRef,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Prediction store whose per-member reads take a fixed time, so a rebuild
/// can be observed while it is running
#[derive(Clone)]
pub struct SlowPredictionRepository {
    inner: Arc<InMemoryPredictionRepository>,
    delay: Duration,
    member_reads: Arc<AtomicUsize>,
}

impl SlowPredictionRepository {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: Arc::new(InMemoryPredictionRepository::new()),
            delay,
            member_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn member_reads(&self) -> usize {
        self.member_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionRepository for SlowPredictionRepository {
    async fn save_prediction(&self, prediction: &Prediction) -> Result<(), AppError> {
        self.inner.save_prediction(prediction).await
    }

    async fn get_prediction(&self, id: &str) -> Result<Option<Prediction>, AppError> {
        self.inner.get_prediction(id).await
    }

    async fn predictions_for_member(&self, kup_id: &str, member_id: &str) -> Result<Vec<Prediction>, AppError> {
        self.member_reads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.inner.predictions_for_member(kup_id, member_id).await
    }

    async fn predictions_for_kup(&self, kup_id: &str) -> Result<Vec<Prediction>, AppError> {
        self.inner.predictions_for_kup(kup_id).await
    }

    async fn predictions_for_scope(&self, scope: &ScopeRef) -> Result<Vec<Prediction>, AppError> {
        self.inner.predictions_for_scope(scope).await
    }

    async fn last_graded_at(&self, kup_id: &str) -> Result<Option<DateTime<Utc>>, AppError> {
        self.inner.last_graded_at(kup_id).await
    }
}
