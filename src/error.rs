//! Error types for the integrity checker

use thiserror::Error;

/// Errors that can occur while analyzing a submission or running the service
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid submission: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

/// Structural problems with a submission that serde alone cannot reject
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be >= 0, got {value}")]
    NegativeCount { field: &'static str, value: i64 },
}
