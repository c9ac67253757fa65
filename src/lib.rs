// Library crate for the Kup scoring engine
// This file exposes the public API for the binary and integration tests

pub mod event;
pub mod kup;
pub mod prediction;
pub mod ranking;
pub mod scheduler;
pub mod scoring;
pub mod shared;
pub mod sport;
pub mod tournament;

// Re-export commonly used types for easier access in tests
pub use event::{EventBus, KupEvent, TournamentEvent, TournamentSubscription};
pub use kup::{GameMode, Kup, KupLocks, KupService, KupState};
pub use prediction::{Outcome, Prediction, PredictionKind, PredictionResult};
pub use ranking::{RankingEntry, RankingTable};
pub use scheduler::{RecomputeOutcome, SchedulerConfig, ScopeFinalizedSubscriber, ScoringService};
pub use scoring::{PointsRule, PointsRuleRegistry, ScoringContext, ScoringError};
pub use shared::AppError;
pub use sport::{Contestant, ContestantType, ScopeRef};
