use serde::{Deserialize, Serialize};

use crate::ranking::RankingEntry;
use crate::sport::ScopeRef;

/// Events published per Kup for feed and messaging collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KupEvent {
    /// A new ranking table was committed
    RankingUpdated {
        kup_id: String,
        top: Vec<RankingEntry>,
        participants: usize,
    },
}

impl KupEvent {
    pub fn kup_id(&self) -> &str {
        match self {
            KupEvent::RankingUpdated { kup_id, .. } => kup_id,
        }
    }
}

/// Signals coming from result ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TournamentEvent {
    /// Official results for the scope are persisted and final
    ScopeFinalized { scope: ScopeRef },
}
