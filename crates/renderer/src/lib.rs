//! Renderer - One interface for producing Word and PDF documents
//!
//! This crate puts blank documents and filled templates behind the same
//! [`Renderer`] trait:
//! - [`WordRenderer`] with a blank [`Section`] or a [`TemplateDocument`] context
//! - [`PdfRenderer`] drawing on a [`Canvas`] or laying out an [`HtmlDocument`]
//! - [`RenderDelegate`] hooks run before every save
//! - [`RendererFactory`] choosing the renderer and context from the request
//! - [`SettingsManager`] for JSON settings files
//!
//! [`TemplateDocument`]: word_template::TemplateDocument

mod delegate;
mod error;
mod factory;
pub mod pdf;
mod renderer;
mod settings;
pub mod word;

#[cfg(test)]
mod tests;

pub use delegate::RenderDelegate;
pub use error::{RenderError, Result};
pub use factory::{AnyRenderer, RendererFactory};
pub use pdf::{
    Align, Canvas, HtmlDocument, HtmlWriter, MultiPage, PageSetup, PdfCanvas, PdfContext, PdfRenderer,
};
pub use renderer::{Renderer, TemplateRenderer};
pub use settings::{OutputSettings, PdfSettings, RendererSettings, SettingsManager};
pub use word::{Block, DocumentSink, Section, WordContext, WordRenderer};
