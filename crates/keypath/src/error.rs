//! Error types for bindings and key paths

use thiserror::Error;

/// Errors that can occur while building bindings or parsing key paths
#[derive(Debug, Error)]
pub enum KeyPathError {
    /// Error converting a value to JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bindings can only be built from a JSON object
    #[error("Expected a JSON object for bindings, got {0}")]
    NotAnObject(&'static str),

    /// Malformed key path expression
    #[error("Invalid key path: {0:?}")]
    InvalidPath(String),
}

/// Result type for key path operations
pub type Result<T> = std::result::Result<T, KeyPathError>;
