//! DOCX package support
//!
//! A DOCX file is a ZIP archive containing XML parts:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships, pointing at the main document part
//! - `word/document.xml` - Main document content
//!
//! This module writes the minimal package needed for a valid document and
//! reads parts back, including locating the main document part through the
//! root relationships.

mod content_types;
mod reader;
mod relationships;
mod writer;

pub use content_types::ContentTypes;
pub use reader::DocxReader;
pub use relationships::{Relationship, Relationships};
pub use writer::{document_xml, escape_xml, DocxWriter};

/// Name of the main document part in a standard package
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";
/// Name of the root relationships part
pub const ROOT_RELS_PART: &str = "_rels/.rels";
/// Name of the content types part
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// XML namespaces used in DOCX files
pub mod namespaces {
    /// Main WordprocessingML namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    /// Relationships namespace
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    /// Package relationships namespace
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    /// Content types namespace
    pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
}

/// Relationship types used in DOCX
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
}

/// Content types for DOCX parts
pub mod content_type_values {
    pub const DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
}

/// Main document part named by a root relationships part, if any
pub fn main_document_part(root_rels_xml: &str) -> crate::Result<Option<String>> {
    let rels = Relationships::parse(root_rels_xml)?;
    Ok(rels
        .find_type(relationship_types::DOCUMENT)
        .map(|rel| package_part_name(&rel.target)))
}

/// Archive entry name for a target relative to the package root
///
/// Drops a leading `/`, empty and `.` segments, and resolves `..`.
pub fn package_part_name(target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
