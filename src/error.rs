//! Error types for persistence, authentication, and the model gateway.

use thiserror::Error;

/// Errors from the whole-blob state store.
///
/// A structurally incompatible stored blob surfaces as `Json`; there is no
/// corruption-recovery path.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state blob: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the model gateway and prompt resolution.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status from the model endpoint, carrying the
    /// response's status text.
    #[error("Model endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unknown prompt template: {0}")]
    UnknownTemplate(String),
}

/// Authentication failure. A single generic variant: callers cannot
/// distinguish an unknown UID from a wrong password.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid ID (UID) or password.")]
    InvalidCredentials,
}
