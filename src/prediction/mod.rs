pub mod grading;
pub mod models;
pub mod repository;

pub use grading::{grade, GradingError};
pub use models::{
    result_label, Outcome, Prediction, PredictionKind, PredictionResult, ScoreMatch,
};
pub use repository::{InMemoryPredictionRepository, PredictionRepository};
