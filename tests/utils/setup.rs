use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use kupscore::{
    event::{EventBus, TournamentSubscription},
    kup::{InMemoryKupRepository, KupRepository},
    prediction::{InMemoryPredictionRepository, PredictionRepository},
    ranking::{InMemoryRankingRepository, RankingRepository},
    scheduler::{SchedulerConfig, ScopeFinalizedSubscriber, ScoringService},
    tournament::InMemoryResultSource,
    GameMode, Kup, KupLocks, KupService, PointsRuleRegistry, Prediction, ScopeRef,
};

use super::mocks::SlowPredictionRepository;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub event_bus: EventBus,
    pub kup_repository: Arc<InMemoryKupRepository>,
    pub prediction_repository: Arc<dyn PredictionRepository>,
    pub ranking_repository: Arc<InMemoryRankingRepository>,
    pub results: Arc<InMemoryResultSource>,
    pub kup_service: KupService,
    pub scoring_service: Arc<ScoringService>,
    pub locks: KupLocks,
    pub _subscription_handle: Option<JoinHandle<()>>,
}

impl TestSetup {
    /// Creates a Kup with the given members in join order
    pub async fn create_kup(&self, kup: Kup, members: &[&str]) -> Kup {
        let kup = self.kup_service.create_kup(kup).await.unwrap();
        for member in members {
            self.kup_service.join(&kup.id, member).await.unwrap();
        }
        self.kup_service.get_kup(&kup.id).await.unwrap()
    }

    pub async fn submit(&self, predictions: Vec<Prediction>) {
        for prediction in predictions {
            self.kup_service.submit_prediction(prediction).await.unwrap();
        }
    }

    /// Wires a second scoring service onto the same stores and guards
    pub fn scoring_service_with(&self, registry: PointsRuleRegistry, config: SchedulerConfig) -> ScoringService {
        ScoringService::builder(
            self.kup_repository.clone(),
            self.prediction_repository.clone(),
            self.ranking_repository.clone(),
            self.results.clone(),
            self.locks.clone(),
        )
        .with_registry(Arc::new(registry))
        .with_event_bus(self.event_bus.clone())
        .with_config(config)
        .build()
    }

    pub async fn kup(&self, kup_id: &str) -> Kup {
        self.kup_repository.get_kup(kup_id).await.unwrap().unwrap()
    }

    pub async fn has_table(&self, kup_id: &str) -> bool {
        self.ranking_repository.get_table(kup_id).await.unwrap().is_some()
    }
}

pub struct TestSetupBuilder {
    registry: Option<PointsRuleRegistry>,
    config: SchedulerConfig,
    slow_predictions: Option<SlowPredictionRepository>,
    subscribe_to_finalizations: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            config: SchedulerConfig::default(),
            slow_predictions: None,
            subscribe_to_finalizations: false,
        }
    }

    pub fn with_registry(mut self, registry: PointsRuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_recompute_timeout(mut self, timeout: Duration) -> Self {
        self.config.recompute_timeout = timeout;
        self
    }

    pub fn with_notify_top_n(mut self, n: usize) -> Self {
        self.config.notify_top_n = n;
        self
    }

    /// Uses a prediction store whose per-member reads take `delay`
    pub fn with_slow_predictions(mut self, repository: SlowPredictionRepository) -> Self {
        self.slow_predictions = Some(repository);
        self
    }

    /// Routes `ScopeFinalized` events on the bus to the scoring service
    pub fn with_finalization_subscriber(mut self) -> Self {
        self.subscribe_to_finalizations = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let event_bus = EventBus::new();
        let locks = KupLocks::new();
        let kup_repository = Arc::new(InMemoryKupRepository::new());
        let ranking_repository = Arc::new(InMemoryRankingRepository::new());
        let results = Arc::new(InMemoryResultSource::new());
        let prediction_repository: Arc<dyn PredictionRepository> = match self.slow_predictions {
            Some(slow) => Arc::new(slow),
            None => Arc::new(InMemoryPredictionRepository::new()),
        };

        let kup_service = KupService::new(
            kup_repository.clone(),
            prediction_repository.clone(),
            ranking_repository.clone(),
            locks.clone(),
            event_bus.clone(),
        );

        let scoring_service = Arc::new(
            ScoringService::builder(
                kup_repository.clone(),
                prediction_repository.clone(),
                ranking_repository.clone(),
                results.clone(),
                locks.clone(),
            )
            .with_registry(Arc::new(self.registry.unwrap_or_default()))
            .with_event_bus(event_bus.clone())
            .with_config(self.config)
            .build(),
        );

        let subscription_handle = self.subscribe_to_finalizations.then(|| {
            TournamentSubscription::new(
                Arc::new(ScopeFinalizedSubscriber::new(scoring_service.clone())),
                event_bus.clone(),
            )
            .start()
        });

        TestSetup {
            event_bus,
            kup_repository,
            prediction_repository,
            ranking_repository,
            results,
            kup_service,
            scoring_service,
            locks,
            _subscription_handle: subscription_handle,
        }
    }
}

/// Ordered-list Kup scoped to round `r-1`
pub fn podium_kup(id: &str) -> Kup {
    Kup::new(format!("{id} pool"), GameMode::ordered_list(), ScopeRef::Round("r-1".into())).with_id(id)
}
