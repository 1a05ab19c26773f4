//! Word renderer
//!
//! A `WordRenderer` either builds a document from scratch (blank context) or
//! fills a template (template context). Both are saved through the same
//! [`Renderer`] interface.

mod section;

pub use section::{Block, DocumentSink, Section};

use crate::delegate::RenderDelegate;
use crate::error::{RenderError, Result};
use crate::renderer::{Renderer, TemplateRenderer};
use keypath::Value;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use store::DocxWriter;
use word_template::{TemplateDocument, TemplateOptions};

/// What a Word renderer writes
#[derive(Debug)]
pub enum WordContext {
    /// A new document built through [`DocumentSink`]
    Blank(Section),
    /// A loaded template filled by placeholder substitution
    Template(TemplateDocument),
}

impl WordContext {
    pub fn is_template(&self) -> bool {
        matches!(self, WordContext::Template(_))
    }

    pub fn as_template_mut(&mut self) -> Option<&mut TemplateDocument> {
        match self {
            WordContext::Template(doc) => Some(doc),
            WordContext::Blank(_) => None,
        }
    }

    pub fn as_section_mut(&mut self) -> Option<&mut Section> {
        match self {
            WordContext::Blank(section) => Some(section),
            WordContext::Template(_) => None,
        }
    }
}

impl Default for WordContext {
    fn default() -> Self {
        WordContext::Blank(Section::new())
    }
}

/// Renderer producing Word (DOCX) documents
pub struct WordRenderer {
    context: WordContext,
    save_path: Option<PathBuf>,
    delegate: Option<Box<dyn RenderDelegate<WordContext>>>,
}

impl WordRenderer {
    /// Renderer with an empty blank document
    pub fn new() -> Self {
        Self::with_context(WordContext::default())
    }

    pub fn with_context(context: WordContext) -> Self {
        Self {
            context,
            save_path: None,
            delegate: None,
        }
    }

    /// Renderer backed by the template at `path`
    pub fn with_template_options(path: impl AsRef<Path>, options: TemplateOptions) -> Result<Self> {
        let path = path.as_ref();
        store::ensure_readable(path).map_err(|_| RenderError::TemplateNotReadable(path.to_path_buf()))?;

        let document = TemplateDocument::open_with_options(path, options)?;
        Ok(Self::with_context(WordContext::Template(document)))
    }

    /// Install the hook called before every save or output
    pub fn set_delegate(&mut self, delegate: impl RenderDelegate<WordContext> + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Content sink of a blank document; `None` for templates
    pub fn sink(&mut self) -> Option<&mut dyn DocumentSink> {
        self.context
            .as_section_mut()
            .map(|section| section as &mut dyn DocumentSink)
    }

    fn notify_delegate(&mut self) -> Result<()> {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.will_save_document(&mut self.context)?;
        }
        Ok(())
    }
}

impl Default for WordRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WordRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordRenderer")
            .field("context", &self.context)
            .field("save_path", &self.save_path)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

impl Renderer for WordRenderer {
    type Context = WordContext;

    fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let destination = self.resolve_save_path(path)?;
        self.notify_delegate()?;

        match &mut self.context {
            WordContext::Template(document) => document.save(&destination)?,
            WordContext::Blank(section) => {
                let dir = store::ensure_parent_dir(&destination)?;
                let mut staged = store::output_temp_in(&dir, &destination)?;
                DocxWriter::new(staged.as_file_mut()).write(&section.to_body_xml())?;
                store::persist_to(staged.into_temp_path(), &destination)?;
                tracing::info!("Saved blank document to {}", destination.display());
            }
        }

        Ok(destination)
    }

    fn output(&mut self, writer: &mut dyn Write) -> Result<u64> {
        self.notify_delegate()?;

        match &mut self.context {
            WordContext::Template(document) => Ok(document.write_to(writer)?),
            WordContext::Blank(section) => {
                let buffer = DocxWriter::new(Cursor::new(Vec::new()))
                    .write(&section.to_body_xml())?
                    .into_inner();
                writer.write_all(&buffer)?;
                writer.flush()?;
                Ok(buffer.len() as u64)
            }
        }
    }

    fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    fn set_save_path(&mut self, path: PathBuf) {
        self.save_path = Some(path);
    }

    fn context(&self) -> &WordContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut WordContext {
        &mut self.context
    }

    fn set_context(&mut self, context: WordContext) -> WordContext {
        std::mem::replace(&mut self.context, context)
    }
}

impl TemplateRenderer for WordRenderer {
    fn with_template(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_template_options(path, TemplateOptions::default())
    }

    fn assign(&mut self, key: &str, value: Value) -> Result<&mut Self> {
        let document = self.context.as_template_mut().ok_or(RenderError::NoTemplate)?;
        document.assign(key, value);
        Ok(self)
    }
}
