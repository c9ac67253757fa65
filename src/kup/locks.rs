use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};

/// Per-Kup mutual exclusion.
///
/// Every write to a Kup's membership, predictions' graded results or ranking
/// table happens while holding that Kup's guard. Different Kups never share a
/// lock.
#[derive(Debug, Clone, Default)]
pub struct KupLocks {
    kup_mutexes: Arc<RwLock<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KupLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the Kup's guard
    pub async fn acquire(&self, kup_id: &str) -> OwnedMutexGuard<()> {
        self.kup_lock(kup_id).await.lock_owned().await
    }

    /// Takes the Kup's guard only if nobody holds it
    pub async fn try_acquire(&self, kup_id: &str) -> Option<OwnedMutexGuard<()>> {
        self.kup_lock(kup_id).await.try_lock_owned().ok()
    }

    pub async fn clear(&self, kup_id: &str) {
        let mut guard = self.kup_mutexes.write().await;
        guard.remove(kup_id);
    }

    async fn kup_lock(&self, kup_id: &str) -> Arc<AsyncMutex<()>> {
        {
            let guard = self.kup_mutexes.read().await;
            if let Some(lock) = guard.get(kup_id) {
                return lock.clone();
            }
        }

        let mut guard = self.kup_mutexes.write().await;
        guard
            .entry(kup_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
