use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::RankingTable;
use crate::shared::AppError;

/// Storage for committed ranking tables.
///
/// Readers receive an immutable snapshot; a writer clones the snapshot,
/// mutates the copy and commits it with [`RankingRepository::save_table`],
/// which replaces the previous snapshot atomically.
#[async_trait]
pub trait RankingRepository: Send + Sync {
    async fn get_table(&self, kup_id: &str) -> Result<Option<Arc<RankingTable>>, AppError>;
    async fn save_table(&self, table: RankingTable) -> Result<(), AppError>;
    async fn delete_table(&self, kup_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default)]
pub struct InMemoryRankingRepository {
    tables: RwLock<HashMap<String, Arc<RankingTable>>>,
}

impl InMemoryRankingRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RankingRepository for InMemoryRankingRepository {
    async fn get_table(&self, kup_id: &str) -> Result<Option<Arc<RankingTable>>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.get(kup_id).cloned())
    }

    #[instrument(skip(self, table), fields(kup_id = %table.kup_id))]
    async fn save_table(&self, table: RankingTable) -> Result<(), AppError> {
        debug!(entries = table.len(), "Committing ranking table");
        let mut tables = self.tables.write().await;
        tables.insert(table.kup_id.clone(), Arc::new(table));
        Ok(())
    }

    async fn delete_table(&self, kup_id: &str) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables
            .remove(kup_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("ranking table for {}", kup_id)))
    }
}
