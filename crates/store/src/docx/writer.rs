//! Writing minimal DOCX packages
//!
//! A package written here holds the main document part, the root
//! relationships, and the content type table. Extra parts can be added with
//! [`DocxWriter::write_file`] before the package is finished.

use crate::docx::content_types::ContentTypes;
use crate::docx::relationships::Relationships;
use crate::docx::{namespaces, CONTENT_TYPES_PART, MAIN_DOCUMENT_PART, ROOT_RELS_PART};
use crate::Result;
use std::borrow::Cow;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Streams a DOCX package into any seekable sink
pub struct DocxWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    content_types: ContentTypes,
    root_rels: Relationships,
}

impl<W: Write + Seek> DocxWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            content_types: ContentTypes::for_document(),
            root_rels: Relationships::for_document(),
        }
    }

    /// Write a complete package whose body holds `body_xml`, returning the sink
    pub fn write(mut self, body_xml: &str) -> Result<W> {
        self.write_file(MAIN_DOCUMENT_PART, &document_xml(body_xml))?;

        let root_rels_xml = self.root_rels.to_xml();
        self.write_file(ROOT_RELS_PART, &root_rels_xml)?;

        // [Content_Types].xml last
        let content_types_xml = self.content_types.to_xml();
        self.write_file(CONTENT_TYPES_PART, &content_types_xml)?;

        Ok(self.zip.finish()?)
    }

    /// Add a deflated entry to the package
    pub fn write_file(&mut self, path: &str, content: &str) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        self.zip.start_file(path, options)?;
        self.zip.write_all(content.as_bytes())?;

        Ok(())
    }
}

/// Wrap body markup in a `w:document` element
pub fn document_xml(body_xml: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"{}\" xmlns:r=\"{}\"><w:body>{}</w:body></w:document>",
        namespaces::W,
        namespaces::R,
        body_xml
    )
}

/// Escape text for use in element content or attribute values
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}
