pub mod config;
pub mod service;
pub mod subscriber;
pub mod task;

pub use config::SchedulerConfig;
pub use service::{
    FinalizationReport, KupFinalization, RecomputeOutcome, RecomputeReport, ScoringService,
    ScoringServiceBuilder,
};
pub use subscriber::ScopeFinalizedSubscriber;
pub use task::start_scoring_task;
