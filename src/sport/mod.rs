// Sport reference data consumed by predictions
//
// Contestants, countries and tournament scope references are immutable once
// created (property bags excepted).

pub mod models;

pub use models::{Contestant, ContestantType, Country, ScopeRef};
