//! The uniform renderer interface

use crate::error::{RenderError, Result};
use keypath::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A document renderer
///
/// `Context` is the object callers fill with content, e.g. a blank section or
/// a loaded template.
pub trait Renderer {
    type Context;

    /// Write the document to `path`, or to the configured save path when
    /// `path` is `None`. Returns the path written.
    fn save(&mut self, path: Option<&Path>) -> Result<PathBuf>;

    /// Write the document into `writer`, returning the number of bytes
    fn output(&mut self, writer: &mut dyn Write) -> Result<u64>;

    fn save_path(&self) -> Option<&Path>;

    fn set_save_path(&mut self, path: PathBuf);

    fn context(&self) -> &Self::Context;

    fn context_mut(&mut self) -> &mut Self::Context;

    /// Replace the context, returning the previous one
    fn set_context(&mut self, context: Self::Context) -> Self::Context;

    /// Destination for a save: the explicit path or the configured one
    fn resolve_save_path(&self, path: Option<&Path>) -> Result<PathBuf> {
        path.or_else(|| self.save_path())
            .map(Path::to_path_buf)
            .ok_or(RenderError::NoSavePath)
    }
}

/// A renderer that can be built from a template file and filled with values
pub trait TemplateRenderer: Renderer + Sized {
    fn with_template(path: impl AsRef<Path>) -> Result<Self>;

    /// Bind a value for substitution into the template
    fn assign(&mut self, key: &str, value: Value) -> Result<&mut Self>;
}
