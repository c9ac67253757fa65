use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use super::service::ScoringService;
use crate::event::{HandlerError, TournamentEvent, TournamentEventHandler};
use crate::scoring::ScoringError;

/// Grades predictions and updates standings whenever a scope is finalized
pub struct ScopeFinalizedSubscriber {
    scoring_service: Arc<ScoringService>,
}

impl ScopeFinalizedSubscriber {
    pub fn new(scoring_service: Arc<ScoringService>) -> Self {
        Self { scoring_service }
    }
}

#[async_trait]
impl TournamentEventHandler for ScopeFinalizedSubscriber {
    async fn handle_tournament_event(&self, event: TournamentEvent) -> Result<(), HandlerError> {
        match event {
            TournamentEvent::ScopeFinalized { scope } => {
                let report = self
                    .scoring_service
                    .on_scope_finalized(&scope)
                    .await
                    .map_err(|err| {
                        error!(scope = %scope, error = %err, "Failed to process finalized scope");
                        to_handler_error(err)
                    })?;

                info!(
                    scope = %scope,
                    graded = report.graded(),
                    kups = report.updated.len(),
                    "Finalized scope processed"
                );
                Ok(())
            }
        }
    }

    fn handler_name(&self) -> &'static str {
        "ScopeFinalizedSubscriber"
    }
}

fn to_handler_error(err: ScoringError) -> HandlerError {
    match err {
        ScoringError::Repository(_) | ScoringError::Timeout { .. } => HandlerError::Retryable(err.to_string()),
        _ => HandlerError::NonRetryable(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kup::{GameMode, KupError, KupState};
    use crate::shared::AppError;
    use crate::sport::ScopeRef;
    use std::time::Duration;

    #[test]
    fn test_repository_failures_are_retryable() {
        let err = to_handler_error(ScoringError::Repository(AppError::DatabaseError("down".into())));
        assert!(err.is_retryable());

        let err = to_handler_error(ScoringError::Timeout {
            kup_id: "k".into(),
            elapsed: Duration::from_secs(1),
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn test_logic_failures_are_not_retryable() {
        assert!(!to_handler_error(ScoringError::RuleMissing(GameMode::new("podium"))).is_retryable());
        assert!(!to_handler_error(ScoringError::ScopeNotFinal(ScopeRef::Round("r".into()))).is_retryable());
        assert!(!to_handler_error(ScoringError::Kup(KupError::InvalidTransition {
            kup_id: "k".into(),
            from: KupState::Final,
            to: KupState::Grading,
        }))
        .is_retryable());
    }
}
