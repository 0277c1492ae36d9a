//! Error types for clinvox-app
//!
//! App-level errors wrap the common store errors and add the capture and
//! serving concerns. Validation failures carry one entry per offending field
//! so a front end can mark them individually.

use thiserror::Error;

/// One rejected input field with a user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validation failure covering one or more fields
#[derive(Debug, Clone, Error)]
#[error("Validation failed: {}", describe(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for clinvox-app
#[derive(Error, Debug)]
pub enum Error {
    /// Record store or configuration error from the common crate
    #[error(transparent)]
    Common(#[from] clinvox_common::Error),

    /// User input outside the configured bounds
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Capture session transition not allowed from the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Microphone access or device failure, already user-facing
    #[error("Device error: {0}")]
    Device(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),
}

/// Convenience Result type using the clinvox-app Error
pub type Result<T> = std::result::Result<T, Error>;
