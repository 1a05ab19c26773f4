//! Error types for template documents

use std::path::PathBuf;
use store::{ArchiveStatus, StoreError};
use thiserror::Error;

/// Errors that can occur while loading, filling, or saving a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file missing or unreadable, or destination directory missing
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Copy, staging, or other file system failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The working copy could not be opened as an archive
    #[error("Could not open archive {}: {status}", path.display())]
    ArchiveOpen { path: PathBuf, status: ArchiveStatus },

    /// Flushing the rewritten archive failed; the output was discarded
    #[error("Could not close archive {}: {status}", path.display())]
    ArchiveClose { path: PathBuf, status: ArchiveStatus },

    /// The finished archive could not be moved onto the destination
    #[error("Could not move rendered document to {}: {source}", destination.display())]
    Relocate {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive has no main document part
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// The main document part is not valid UTF-8
    #[error("Document part is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// A placeholder key path did not resolve and the policy is to fail
    #[error("Unresolved placeholder: {{{0}}}")]
    UnresolvedPlaceholder(String),

    /// A raw replacement pattern is not a valid regular expression
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A value could not be converted for binding
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other archive failure
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TemplateError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(e) => TemplateError::Io(e),
            StoreError::InvalidPath(path) => TemplateError::InvalidPath(path),
            StoreError::ArchiveOpen { path, status } => TemplateError::ArchiveOpen { path, status },
            StoreError::ArchiveClose { path, status } => TemplateError::ArchiveClose { path, status },
            StoreError::MissingEntry(name) => TemplateError::MissingPart(name),
            StoreError::Relocate { to, source, .. } => TemplateError::Relocate {
                destination: to,
                source,
            },
            other => TemplateError::Store(other),
        }
    }
}

/// Result type for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
