use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{bus::EventBus, handler::TournamentEventHandler};

/// Routes tournament events from the bus to a handler
pub struct TournamentSubscription {
    handler: Arc<dyn TournamentEventHandler>,
    event_bus: EventBus,
}

impl TournamentSubscription {
    pub fn new(handler: Arc<dyn TournamentEventHandler>, event_bus: EventBus) -> Self {
        Self { handler, event_bus }
    }

    /// Spawns a background task that feeds every received event to the handler
    pub fn start(self) -> JoinHandle<()> {
        let handler_name = self.handler.handler_name();
        let mut receiver = self.event_bus.subscribe_tournament();

        info!(handler = handler_name, "Starting tournament subscription");

        tokio::spawn(async move {
            loop {
                let event = match receiver.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(handler = handler_name, skipped, "Tournament subscription lagged");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                info!(handler = handler_name, event = ?event, "Received tournament event");

                if let Err(e) = self.handler.handle_tournament_event(event).await {
                    warn!(
                        handler = handler_name,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Tournament event handler failed"
                    );
                }
            }

            warn!(handler = handler_name, "Tournament subscription ended - no more events");
        })
    }
}
