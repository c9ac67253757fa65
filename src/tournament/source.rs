use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::prediction::Outcome;
use crate::shared::AppError;
use crate::sport::ScopeRef;

/// Official results, already ingested and persisted by the result feed
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn is_scope_final(&self, scope: &ScopeRef) -> Result<bool, AppError>;

    /// Outcome of a final scope, `None` while the scope is still running
    async fn final_outcome(&self, scope: &ScopeRef) -> Result<Option<Outcome>, AppError>;
}

/// In-memory result source for development and testing
#[derive(Debug, Default)]
pub struct InMemoryResultSource {
    finals: RwLock<HashMap<ScopeRef, Option<Outcome>>>,
}

impl InMemoryResultSource {
    pub fn new() -> Self {
        Self {
            finals: RwLock::new(HashMap::new()),
        }
    }

    /// Marks a scope final with the outcome predictions are graded against
    #[instrument(skip(self, outcome))]
    pub async fn publish(&self, scope: ScopeRef, outcome: Outcome) {
        info!("Publishing final outcome");
        self.finals.write().await.insert(scope, Some(outcome));
    }

    /// Marks a container scope (season, stage) final without an outcome of its own
    pub async fn finalize(&self, scope: ScopeRef) {
        self.finals.write().await.entry(scope).or_insert(None);
    }
}

#[async_trait]
impl ResultSource for InMemoryResultSource {
    async fn is_scope_final(&self, scope: &ScopeRef) -> Result<bool, AppError> {
        Ok(self.finals.read().await.contains_key(scope))
    }

    async fn final_outcome(&self, scope: &ScopeRef) -> Result<Option<Outcome>, AppError> {
        Ok(self.finals.read().await.get(scope).cloned().flatten())
    }
}
