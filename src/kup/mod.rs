pub mod locks;
pub mod models;
pub mod repository;
pub mod service;

mod errors;

pub use errors::KupError;
pub use locks::KupLocks;
pub use models::{game_mode, GameMode, Kup, KupState, ScoringParameters};
pub use repository::{InMemoryKupRepository, KupRepository};
pub use service::KupService;
