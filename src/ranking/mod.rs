pub mod models;
pub mod repository;

pub use models::{RankingEntry, RankingTable};
pub use repository::{InMemoryRankingRepository, RankingRepository};
