use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::{KupEvent, TournamentEvent};

const KUP_CHANNEL_CAPACITY: usize = 100;
const TOURNAMENT_CHANNEL_CAPACITY: usize = 1000;

/// Event bus distributing ranking updates and finalization signals
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Kup-specific event channels: kup_id -> sender
    kup_channels: Arc<RwLock<HashMap<String, broadcast::Sender<KupEvent>>>>,
    tournament: broadcast::Sender<TournamentEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tournament, _) = broadcast::channel(TOURNAMENT_CHANNEL_CAPACITY);
        Self {
            kup_channels: Arc::new(RwLock::new(HashMap::new())),
            tournament,
        }
    }

    /// Emits an event to all subscribers of a specific Kup
    pub async fn emit_to_kup(&self, kup_id: &str, event: KupEvent) {
        let sender = self.kup_sender(kup_id).await;
        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(kup_id = %kup_id, receivers = receiver_count, "Kup event emitted");
            }
            Err(_) => {
                debug!(kup_id = %kup_id, "Kup event emitted with no receivers");
            }
        }
    }

    /// Subscribe to events for a specific Kup
    pub async fn subscribe_to_kup(&self, kup_id: &str) -> broadcast::Receiver<KupEvent> {
        self.kup_sender(kup_id).await.subscribe()
    }

    /// Drops a Kup's channel; its subscribers see the channel close
    pub async fn remove_kup(&self, kup_id: &str) {
        if self.kup_channels.write().await.remove(kup_id).is_some() {
            debug!(kup_id = %kup_id, "Kup channel removed");
        }
    }

    pub fn emit_tournament(&self, event: TournamentEvent) {
        if self.tournament.send(event).is_err() {
            debug!("Tournament event emitted with no receivers");
        }
    }

    pub fn subscribe_tournament(&self) -> broadcast::Receiver<TournamentEvent> {
        self.tournament.subscribe()
    }

    async fn kup_sender(&self, kup_id: &str) -> broadcast::Sender<KupEvent> {
        {
            let kup_channels = self.kup_channels.read().await;
            if let Some(sender) = kup_channels.get(kup_id) {
                return sender.clone();
            }
        }

        debug!(kup_id = %kup_id, "No Kup channel found - creating one");
        let mut kup_channels = self.kup_channels.write().await;
        kup_channels
            .entry(kup_id.to_string())
            .or_insert_with(|| broadcast::channel(KUP_CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sport::ScopeRef;

    #[tokio::test]
    async fn test_kup_subscribers_receive_only_their_kup() {
        let bus = EventBus::new();
        let mut first = bus.subscribe_to_kup("kup-1").await;
        let mut second = bus.subscribe_to_kup("kup-2").await;

        bus.emit_to_kup(
            "kup-1",
            KupEvent::RankingUpdated {
                kup_id: "kup-1".into(),
                top: vec![],
                participants: 0,
            },
        )
        .await;

        assert_eq!(first.recv().await.unwrap().kup_id(), "kup-1");
        assert!(second.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_removed_kup_channel_closes_subscribers() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe_to_kup("kup-1").await;

        bus.remove_kup("kup-1").await;
        bus.remove_kup("never-created").await;

        assert!(matches!(
            receiver.recv().await,
            Err(broadcast::error::RecvError::Closed)
        ));
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_does_not_fail() {
        let bus = EventBus::new();
        bus.emit_to_kup(
            "nobody",
            KupEvent::RankingUpdated {
                kup_id: "nobody".into(),
                top: vec![],
                participants: 0,
            },
        )
        .await;
        bus.emit_tournament(TournamentEvent::ScopeFinalized {
            scope: ScopeRef::Game("g".into()),
        });
    }

    #[tokio::test]
    async fn test_tournament_events_broadcast() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe_tournament();
        let event = TournamentEvent::ScopeFinalized {
            scope: ScopeRef::Round("r-1".into()),
        };

        bus.clone().emit_tournament(event.clone());

        assert_eq!(receiver.recv().await.unwrap(), event);
    }
}
