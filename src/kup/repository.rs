use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::Kup;
use crate::shared::AppError;

/// Trait for Kup storage operations
#[async_trait]
pub trait KupRepository: Send + Sync {
    async fn create_kup(&self, kup: &Kup) -> Result<(), AppError>;
    async fn get_kup(&self, kup_id: &str) -> Result<Option<Kup>, AppError>;
    async fn save_kup(&self, kup: &Kup) -> Result<(), AppError>;
    async fn list_kups(&self) -> Result<Vec<Kup>, AppError>;
    async fn delete_kup(&self, kup_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of KupRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryKupRepository {
    kups: RwLock<HashMap<String, Kup>>,
}

impl InMemoryKupRepository {
    pub fn new() -> Self {
        Self {
            kups: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl KupRepository for InMemoryKupRepository {
    #[instrument(skip(self, kup), fields(kup_id = %kup.id))]
    async fn create_kup(&self, kup: &Kup) -> Result<(), AppError> {
        let mut kups = self.kups.write().await;
        if kups.contains_key(&kup.id) {
            warn!("Kup already exists in memory");
            return Err(AppError::Conflict(format!("Kup {} already exists", kup.id)));
        }
        kups.insert(kup.id.clone(), kup.clone());
        debug!(name = %kup.name, "Kup created in memory");
        Ok(())
    }

    async fn get_kup(&self, kup_id: &str) -> Result<Option<Kup>, AppError> {
        let kups = self.kups.read().await;
        Ok(kups.get(kup_id).cloned())
    }

    async fn save_kup(&self, kup: &Kup) -> Result<(), AppError> {
        let mut kups = self.kups.write().await;
        match kups.get_mut(&kup.id) {
            Some(existing) => {
                *existing = kup.clone();
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Kup {}", kup.id))),
        }
    }

    async fn list_kups(&self) -> Result<Vec<Kup>, AppError> {
        let kups = self.kups.read().await;
        let mut list: Vec<Kup> = kups.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn delete_kup(&self, kup_id: &str) -> Result<(), AppError> {
        let mut kups = self.kups.write().await;
        kups.remove(kup_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Kup {}", kup_id)))
    }
}
