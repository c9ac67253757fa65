use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    errors::KupError,
    locks::KupLocks,
    models::{Kup, KupState},
    repository::KupRepository,
};
use crate::event::EventBus;
use crate::prediction::{Prediction, PredictionRepository};
use crate::ranking::{RankingRepository, RankingTable};
use crate::sport::ScopeRef;

/// Member-facing Kup operations.
///
/// Keeps the ranking table's entry set equal to the Kup's participants.
pub struct KupService {
    kup_repository: Arc<dyn KupRepository>,
    prediction_repository: Arc<dyn PredictionRepository>,
    ranking_repository: Arc<dyn RankingRepository>,
    locks: KupLocks,
    event_bus: EventBus,
}

impl KupService {
    pub fn new(
        kup_repository: Arc<dyn KupRepository>,
        prediction_repository: Arc<dyn PredictionRepository>,
        ranking_repository: Arc<dyn RankingRepository>,
        locks: KupLocks,
        event_bus: EventBus,
    ) -> Self {
        Self {
            kup_repository,
            prediction_repository,
            ranking_repository,
            locks,
            event_bus,
        }
    }

    /// Stores a new Kup together with its ranking table
    #[instrument(skip(self, kup), fields(kup_id = %kup.id))]
    pub async fn create_kup(&self, kup: Kup) -> Result<Kup, KupError> {
        let _guard = self.locks.acquire(&kup.id).await;
        self.kup_repository.create_kup(&kup).await?;
        if let Err(err) = self
            .ranking_repository
            .save_table(RankingTable::new(kup.id.clone(), &kup.members))
            .await
        {
            warn!(error = %err, "Ranking table not stored, removing Kup");
            if let Err(delete_err) = self.kup_repository.delete_kup(&kup.id).await {
                error!(error = %delete_err, "Could not remove Kup without ranking table");
            }
            return Err(err.into());
        }
        info!(name = %kup.name, game_mode = %kup.game_mode, "Kup created");
        Ok(kup)
    }

    pub async fn get_kup(&self, kup_id: &str) -> Result<Kup, KupError> {
        self.kup_repository
            .get_kup(kup_id)
            .await?
            .ok_or_else(|| KupError::NotFound(kup_id.to_string()))
    }

    /// Adds a member with a zero-point ranking entry
    #[instrument(skip(self))]
    pub async fn join(&self, kup_id: &str, member_id: &str) -> Result<Kup, KupError> {
        let _guard = self.locks.acquire(kup_id).await;
        let mut kup = self.get_kup(kup_id).await?;

        if !kup.add_member(member_id) {
            info!("Member already in Kup");
            return Ok(kup);
        }

        let previous = self.ranking_repository.get_table(kup_id).await?;
        let mut table = table_from(&kup, previous.as_deref());
        table.add_member(member_id);

        self.commit_membership(&kup, previous, table).await?;
        info!(members = kup.members.len(), "Member joined Kup");
        Ok(kup)
    }

    #[instrument(skip(self))]
    pub async fn leave(&self, kup_id: &str, member_id: &str) -> Result<Kup, KupError> {
        let _guard = self.locks.acquire(kup_id).await;
        let mut kup = self.get_kup(kup_id).await?;

        if !kup.remove_member(member_id) {
            return Err(KupError::NotAMember {
                kup_id: kup_id.to_string(),
                member_id: member_id.to_string(),
            });
        }

        let previous = self.ranking_repository.get_table(kup_id).await?;
        let mut table = table_from(&kup, previous.as_deref());
        table.remove_member(member_id);

        self.commit_membership(&kup, previous, table).await?;
        info!(members = kup.members.len(), "Member left Kup");
        Ok(kup)
    }

    /// Accepts a member's prediction while the Kup is open
    #[instrument(skip(self, prediction), fields(kup_id = %prediction.kup_id, member_id = %prediction.member_id))]
    pub async fn submit_prediction(&self, prediction: Prediction) -> Result<Prediction, KupError> {
        let _guard = self.locks.acquire(&prediction.kup_id).await;
        let kup = self.get_kup(&prediction.kup_id).await?;

        if kup.state != KupState::Open {
            warn!(state = %kup.state, "Rejected prediction for closed Kup");
            return Err(KupError::PredictionsClosed {
                kup_id: kup.id,
                state: kup.state,
            });
        }
        if !kup.has_member(&prediction.member_id) {
            return Err(KupError::NotAMember {
                kup_id: kup.id,
                member_id: prediction.member_id,
            });
        }

        self.prediction_repository.save_prediction(&prediction).await?;
        Ok(prediction)
    }

    /// Freezes predictions once the Kup's scope has started
    #[instrument(skip(self))]
    pub async fn lock(&self, kup_id: &str) -> Result<Kup, KupError> {
        let _guard = self.locks.acquire(kup_id).await;
        let mut kup = self.get_kup(kup_id).await?;
        kup.transition(KupState::Locked)?;
        self.kup_repository.save_kup(&kup).await?;
        info!("Kup locked");
        Ok(kup)
    }

    /// Moves a finished round-scoped Kup on to its next round
    #[instrument(skip(self))]
    pub async fn advance_scope(&self, kup_id: &str, next_scope: ScopeRef) -> Result<Kup, KupError> {
        let _guard = self.locks.acquire(kup_id).await;
        let mut kup = self.get_kup(kup_id).await?;
        kup.advance_scope(next_scope)?;
        self.kup_repository.save_kup(&kup).await?;
        info!(scope = %kup.scope, "Kup advanced to next scope");
        Ok(kup)
    }

    /// Deletes a Kup and its ranking table
    #[instrument(skip(self))]
    pub async fn delete_kup(&self, kup_id: &str) -> Result<(), KupError> {
        {
            let _guard = self.locks.acquire(kup_id).await;
            self.kup_repository.delete_kup(kup_id).await?;
            if let Err(err) = self.ranking_repository.delete_table(kup_id).await {
                warn!(error = %err, "Kup had no ranking table");
            }
        }
        self.locks.clear(kup_id).await;
        self.event_bus.remove_kup(kup_id).await;
        Ok(())
    }

    /// Stores a membership change with its ranking table. The table goes
    /// first and is put back if the Kup itself cannot be saved, so members
    /// and entries never drift apart.
    async fn commit_membership(
        &self,
        kup: &Kup,
        previous: Option<Arc<RankingTable>>,
        table: RankingTable,
    ) -> Result<(), KupError> {
        self.ranking_repository.save_table(table).await?;

        if let Err(err) = self.kup_repository.save_kup(kup).await {
            warn!(kup_id = %kup.id, error = %err, "Kup save failed, restoring ranking table");
            let restored = match previous {
                Some(snapshot) => self.ranking_repository.save_table((*snapshot).clone()).await,
                None => self.ranking_repository.delete_table(&kup.id).await,
            };
            if let Err(restore_err) = restored {
                error!(kup_id = %kup.id, error = %restore_err, "Could not restore ranking table");
            }
            return Err(err.into());
        }
        Ok(())
    }
}

fn table_from(kup: &Kup, snapshot: Option<&RankingTable>) -> RankingTable {
    match snapshot {
        Some(table) => table.clone(),
        None => RankingTable::new(kup.id.clone(), &[]),
    }
}
