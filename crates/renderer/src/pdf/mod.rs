//! PDF renderer
//!
//! A `PdfRenderer` either draws on a [`PdfCanvas`] directly or lays out an
//! [`HtmlDocument`]. Both are written through the same [`Renderer`]
//! interface as Word documents.

mod canvas;
mod font;
mod html;
mod page;

pub use canvas::{Align, Canvas, Color, MultiPage, PdfCanvas};
pub use font::{FontFamily, FontSpec, StandardFont};
pub use html::{decode_entities, parse_blocks, HtmlDocument, HtmlWriter};
pub use page::{Orientation, PageFormat, PageSetup, PT_PER_MM};

use crate::delegate::RenderDelegate;
use crate::error::{RenderError, Result};
use crate::renderer::{Renderer, TemplateRenderer};
use crate::word::DocumentSink;
use keypath::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use word_template::TemplateOptions;

/// What a PDF renderer writes
#[derive(Debug, Clone)]
pub enum PdfContext {
    /// Pages drawn through [`Canvas`]
    Canvas(PdfCanvas),
    /// HTML laid out as text when the document is written
    Html(HtmlDocument),
}

impl PdfContext {
    pub fn is_html(&self) -> bool {
        matches!(self, PdfContext::Html(_))
    }

    pub fn as_canvas_mut(&mut self) -> Option<&mut PdfCanvas> {
        match self {
            PdfContext::Canvas(canvas) => Some(canvas),
            PdfContext::Html(_) => None,
        }
    }

    pub fn as_html_mut(&mut self) -> Option<&mut HtmlDocument> {
        match self {
            PdfContext::Html(document) => Some(document),
            PdfContext::Canvas(_) => None,
        }
    }

    /// Pages of the finished document
    fn finish(&self, setup: PageSetup) -> Result<PdfCanvas> {
        match self {
            PdfContext::Canvas(canvas) => Ok(canvas.clone()),
            PdfContext::Html(document) => document.render(setup),
        }
    }
}

/// Renderer producing PDF documents
pub struct PdfRenderer {
    context: PdfContext,
    setup: PageSetup,
    title: Option<String>,
    save_path: Option<PathBuf>,
    delegate: Option<Box<dyn RenderDelegate<PdfContext>>>,
}

impl PdfRenderer {
    /// Renderer with an empty canvas
    pub fn new(setup: PageSetup) -> Self {
        Self::with_context(PdfContext::Canvas(PdfCanvas::new(setup)), setup)
    }

    pub fn with_context(context: PdfContext, setup: PageSetup) -> Self {
        Self {
            context,
            setup,
            title: None,
            save_path: None,
            delegate: None,
        }
    }

    /// Renderer laying out the HTML template at `path`
    pub fn with_html_template(
        path: impl AsRef<Path>,
        options: TemplateOptions,
        setup: PageSetup,
    ) -> Result<Self> {
        let document = HtmlDocument::open(path)?.with_options(options);
        Ok(Self::with_context(PdfContext::Html(document), setup))
    }

    pub fn page_setup(&self) -> PageSetup {
        self.setup
    }

    /// Title for the document information dictionary
    ///
    /// Takes precedence over a canvas title or an HTML `<title>`.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Install the hook called before every save or output
    pub fn set_delegate(&mut self, delegate: impl RenderDelegate<PdfContext> + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    /// Drawing surface of a canvas context; `None` for HTML
    pub fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        self.context
            .as_canvas_mut()
            .map(|canvas| canvas as &mut dyn Canvas)
    }

    /// Content sink of an HTML context; `None` for canvas
    pub fn sink(&mut self) -> Option<&mut dyn DocumentSink> {
        self.context
            .as_html_mut()
            .map(|document| document as &mut dyn DocumentSink)
    }

    /// HTML writer of an HTML context; `None` for canvas
    pub fn html(&mut self) -> Option<&mut dyn HtmlWriter> {
        self.context
            .as_html_mut()
            .map(|document| document as &mut dyn HtmlWriter)
    }

    fn render_bytes(&mut self) -> Result<Vec<u8>> {
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.will_save_document(&mut self.context)?;
        }

        let mut canvas = self.context.finish(self.setup)?;
        if let Some(title) = &self.title {
            canvas.set_title(title.clone());
        }
        canvas.to_bytes()
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new(PageSetup::default())
    }
}

impl std::fmt::Debug for PdfRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfRenderer")
            .field("context", &self.context)
            .field("setup", &self.setup)
            .field("save_path", &self.save_path)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

impl Renderer for PdfRenderer {
    type Context = PdfContext;

    fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let destination = self.resolve_save_path(path)?;
        let dir = store::ensure_parent_dir(&destination)?;
        let bytes = self.render_bytes()?;

        let mut staged = store::output_temp_in(&dir, &destination)?;
        staged.as_file_mut().write_all(&bytes)?;
        store::persist_to(staged.into_temp_path(), &destination)?;

        tracing::info!("Saved PDF document to {}", destination.display());
        Ok(destination)
    }

    fn output(&mut self, writer: &mut dyn Write) -> Result<u64> {
        let bytes = self.render_bytes()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(bytes.len() as u64)
    }

    fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    fn set_save_path(&mut self, path: PathBuf) {
        self.save_path = Some(path);
    }

    fn context(&self) -> &PdfContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut PdfContext {
        &mut self.context
    }

    fn set_context(&mut self, context: PdfContext) -> PdfContext {
        std::mem::replace(&mut self.context, context)
    }
}

impl TemplateRenderer for PdfRenderer {
    fn with_template(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_html_template(path, TemplateOptions::default(), PageSetup::default())
    }

    fn assign(&mut self, key: &str, value: Value) -> Result<&mut Self> {
        let document = self.context.as_html_mut().ok_or(RenderError::NoTemplate)?;
        document.assign(key, value);
        Ok(self)
    }
}
