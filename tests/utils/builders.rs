//! Prediction builders for integration scenarios
#![allow(dead_code)] // Test utilities may not all be used in every test

use kupscore::{Contestant, ContestantType, Kup, Prediction, PredictionKind, ScopeRef};

/// Individual contestants named after the given letters
pub fn contestants(names: &[&str]) -> Vec<Contestant> {
    names
        .iter()
        .map(|name| Contestant::new(name.to_lowercase(), *name, ContestantType::Individual))
        .collect()
}

/// Ordered-list prediction on the Kup's own scope
pub fn ordered_list(kup: &Kup, member: &str, order: &[&str]) -> Prediction {
    Prediction::new(
        kup.id.clone(),
        member,
        kup.scope.clone(),
        PredictionKind::OrderedList {
            contestants: contestants(order),
            drawn: false,
        },
    )
}

pub fn score_prediction(kup: &Kup, member: &str, game: &str, home: u32, away: u32) -> Prediction {
    Prediction::new(
        kup.id.clone(),
        member,
        ScopeRef::Game(game.to_string()),
        PredictionKind::Score { home, away },
    )
}
