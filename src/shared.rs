use thiserror::Error;

/// Errors raised by persistence and result-source collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}
