//! Common error types for ClinVox

use thiserror::Error;

/// Common result type for ClinVox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the record store and its callers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input for a store operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error (wraps serde_json::Error)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
