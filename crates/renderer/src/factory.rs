//! Renderer construction

use crate::error::Result;
use crate::pdf::PdfRenderer;
use crate::renderer::{Renderer, TemplateRenderer};
use crate::settings::RendererSettings;
use crate::word::WordRenderer;
use keypath::Value;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Builds renderers configured from [`RendererSettings`]
#[derive(Debug, Clone, Default)]
pub struct RendererFactory {
    settings: RendererSettings,
}

impl RendererFactory {
    pub fn new(settings: RendererSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Template-backed renderer when `template` is given, blank otherwise
    pub fn create(&self, template: Option<&Path>) -> Result<WordRenderer> {
        let mut renderer = match template {
            Some(path) => {
                tracing::debug!("Creating template renderer for {}", path.display());
                WordRenderer::with_template_options(path, self.settings.template.clone())?
            }
            None => {
                tracing::debug!("Creating blank document renderer");
                WordRenderer::new()
            }
        };

        self.apply_output(&mut renderer);
        Ok(renderer)
    }

    /// HTML-backed PDF renderer when `template` is given, canvas otherwise
    pub fn create_pdf(&self, template: Option<&Path>) -> Result<PdfRenderer> {
        let page = self.settings.pdf.page;
        let mut renderer = match template {
            Some(path) => {
                tracing::debug!("Creating HTML PDF renderer for {}", path.display());
                PdfRenderer::with_html_template(path, self.settings.template.clone(), page)?
            }
            None => {
                tracing::debug!("Creating canvas PDF renderer");
                PdfRenderer::new(page)
            }
        };

        if let Some(title) = &self.settings.pdf.title {
            renderer.set_title(title.clone());
        }
        self.apply_output(&mut renderer);
        Ok(renderer)
    }

    /// Renderer for the output format implied by `destination`'s extension
    ///
    /// `.pdf` gives a PDF renderer (HTML-backed with a template), anything
    /// else a Word renderer.
    pub fn create_for(&self, destination: &Path, template: Option<&Path>) -> Result<AnyRenderer> {
        let is_pdf = destination
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            Ok(AnyRenderer::Pdf(self.create_pdf(template)?))
        } else {
            Ok(AnyRenderer::Word(self.create(template)?))
        }
    }

    fn apply_output<R: Renderer>(&self, renderer: &mut R) {
        if let Some(save_path) = &self.settings.output.save_path {
            renderer.set_save_path(save_path.clone());
        }
    }
}

/// A renderer chosen at run time
#[derive(Debug)]
pub enum AnyRenderer {
    Word(WordRenderer),
    Pdf(PdfRenderer),
}

impl AnyRenderer {
    /// Bind a value on a template-backed renderer
    pub fn assign(&mut self, key: &str, value: Value) -> Result<&mut Self> {
        match self {
            AnyRenderer::Word(renderer) => {
                renderer.assign(key, value)?;
            }
            AnyRenderer::Pdf(renderer) => {
                renderer.assign(key, value)?;
            }
        }
        Ok(self)
    }

    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        match self {
            AnyRenderer::Word(renderer) => renderer.save(path),
            AnyRenderer::Pdf(renderer) => renderer.save(path),
        }
    }

    pub fn output(&mut self, writer: &mut dyn Write) -> Result<u64> {
        match self {
            AnyRenderer::Word(renderer) => renderer.output(writer),
            AnyRenderer::Pdf(renderer) => renderer.output(writer),
        }
    }
}
