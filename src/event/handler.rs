use async_trait::async_trait;
use thiserror::Error;

use super::events::TournamentEvent;

/// Errors that can occur when handling tournament events
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Retryable error: {0}")]
    Retryable(String),

    #[error("Non-retryable error: {0}")]
    NonRetryable(String),
}

impl HandlerError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, HandlerError::Retryable(_))
    }
}

/// Trait for components reacting to result-ingestion signals
#[async_trait]
pub trait TournamentEventHandler: Send + Sync {
    async fn handle_tournament_event(&self, event: TournamentEvent) -> Result<(), HandlerError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
