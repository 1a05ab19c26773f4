//! Error types for renderers

use std::path::PathBuf;
use store::StoreError;
use thiserror::Error;
use word_template::TemplateError;

#[derive(Debug, Error)]
pub enum RenderError {
    /// `save` was called without a path and no save path is configured
    #[error("No save path given and none configured")]
    NoSavePath,

    #[error("Template file is not readable: {}", .0.display())]
    TemplateNotReadable(PathBuf),

    /// The operation needs a template-backed context
    #[error("Renderer has no template loaded")]
    NoTemplate,

    #[error("Unsupported font: {0}")]
    InvalidFont(String),

    #[error("Unsupported color: {0}")]
    InvalidColor(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
