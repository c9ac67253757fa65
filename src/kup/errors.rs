use thiserror::Error;

use super::models::KupState;
use crate::shared::AppError;

#[derive(Debug, Error)]
pub enum KupError {
    #[error("Kup not found: {0}")]
    NotFound(String),

    #[error("Kup {kup_id} cannot move from {from} to {to}")]
    InvalidTransition {
        kup_id: String,
        from: KupState,
        to: KupState,
    },

    #[error("Kup {0} is not round-scoped")]
    NotRoundScoped(String),

    #[error("Kup {kup_id} is not accepting predictions ({state})")]
    PredictionsClosed { kup_id: String, state: KupState },

    #[error("Member {member_id} is not part of Kup {kup_id}")]
    NotAMember { kup_id: String, member_id: String },

    #[error("Repository error: {0}")]
    Repository(#[from] AppError),
}
