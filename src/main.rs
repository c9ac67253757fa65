use kupscore::{
    event::{EventBus, TournamentSubscription},
    kup::{InMemoryKupRepository, KupLocks},
    prediction::InMemoryPredictionRepository,
    ranking::InMemoryRankingRepository,
    scheduler::{start_scoring_task, SchedulerConfig, ScopeFinalizedSubscriber, ScoringService},
    scoring::PointsRuleRegistry,
    tournament::InMemoryResultSource,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kupscore=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Kup scoring engine");

    let config = SchedulerConfig::from_env();
    let registry = Arc::new(PointsRuleRegistry::default());
    info!(game_modes = ?registry.game_modes(), "Points rules registered");

    // In-memory collaborators; persistent stores implement the same traits
    let event_bus = EventBus::new();
    // A Kup service mutating membership must be handed these same guards
    let locks = KupLocks::new();
    let scoring_service = Arc::new(
        ScoringService::builder(
            Arc::new(InMemoryKupRepository::new()),
            Arc::new(InMemoryPredictionRepository::new()),
            Arc::new(InMemoryRankingRepository::new()),
            Arc::new(InMemoryResultSource::new()),
            locks,
        )
        .with_registry(registry)
        .with_event_bus(event_bus.clone())
        .with_config(config)
        .build(),
    );

    let subscription = TournamentSubscription::new(
        Arc::new(ScopeFinalizedSubscriber::new(scoring_service.clone())),
        event_bus,
    )
    .start();
    let scoring_task = tokio::spawn(start_scoring_task(scoring_service));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutting down");
    scoring_task.abort();
    subscription.abort();
}
