//! Error types for storage operations

use crate::status::ArchiveStatus;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Path is missing or unreadable: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Could not open archive {}: {status}", path.display())]
    ArchiveOpen { path: PathBuf, status: ArchiveStatus },

    #[error("Could not close archive {}: {status}", path.display())]
    ArchiveClose { path: PathBuf, status: ArchiveStatus },

    #[error("Archive entry not found: {0}")]
    MissingEntry(String),

    #[error("Could not move {} to {}: {source}", from.display(), to.display())]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(String),
}

impl From<quick_xml::Error> for StoreError {
    fn from(err: quick_xml::Error) -> Self {
        StoreError::Xml(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
