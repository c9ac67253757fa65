use std::time::Duration;
use thiserror::Error;

use crate::kup::{GameMode, KupError};
use crate::shared::AppError;
use crate::sport::ScopeRef;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("No points rule registered for game mode {0}")]
    RuleMissing(GameMode),

    #[error("Kup not found: {0}")]
    KupNotFound(String),

    #[error("Scope {0} is not final")]
    ScopeNotFinal(ScopeRef),

    #[error("Recomputation of Kup {kup_id} timed out after {elapsed:?}")]
    Timeout { kup_id: String, elapsed: Duration },

    #[error("Kup error: {0}")]
    Kup(#[from] KupError),

    #[error("Repository error: {0}")]
    Repository(#[from] AppError),
}
