//! Word Templates
//!
//! Fill `{key.path}` placeholders in a Word document's main part with bound
//! values and write the result to a new file without touching the template.
//!
//! # Features
//!
//! - Private working copy per open template; the source is never modified
//! - Single-pass placeholder substitution, one resolution per distinct key path
//! - Case-insensitive key matching by default
//! - Configurable handling of unbound placeholders
//! - Staged, all-or-nothing saves that may be repeated
//!
//! # Example
//!
//! ```rust,no_run
//! use word_template::TemplateDocument;
//! use serde_json::json;
//!
//! let mut doc = TemplateDocument::open("invoice.docx")?;
//! doc.assign("customer", json!({"name": "Acme"}))
//!     .assign("total", 42.5);
//! doc.save("invoice-acme.docx")?;
//! # Ok::<(), word_template::TemplateError>(())
//! ```

mod document;
mod error;
mod options;
mod placeholder;


pub use document::TemplateDocument;
pub use error::{Result, TemplateError};
pub use options::{TemplateOptions, UnresolvedPolicy};
pub use placeholder::{key_path_of, PlaceholderScan, PLACEHOLDER_PATTERN};
