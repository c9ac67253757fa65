pub mod assertions;
pub mod builders;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::RankingAssertion;
#[allow(unused_imports)]
pub use builders::{contestants, ordered_list, score_prediction};
#[allow(unused_imports)]
pub use mocks::SlowPredictionRepository;
#[allow(unused_imports)]
pub use setup::{podium_kup, TestSetup, TestSetupBuilder};
