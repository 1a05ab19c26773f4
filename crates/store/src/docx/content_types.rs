//! `[Content_Types].xml` generation

use crate::docx::{content_type_values, namespaces, MAIN_DOCUMENT_PART};
use indexmap::IndexMap;

/// Content type table of a package
///
/// Defaults map file extensions, overrides map absolute part names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: IndexMap<String, String>,
    overrides: IndexMap<String, String>,
}

impl ContentTypes {
    /// Table with the `rels` and `xml` extension defaults
    pub fn new() -> Self {
        let mut types = Self::default();
        types.set_default("rels", content_type_values::RELATIONSHIPS);
        types.set_default("xml", content_type_values::XML);
        types
    }

    /// Table for a package whose only content part is the main document
    pub fn for_document() -> Self {
        let mut types = Self::new();
        types.set_override(MAIN_DOCUMENT_PART, content_type_values::DOCUMENT);
        types
    }

    pub fn set_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_string(), content_type.to_string());
    }

    /// Part names are stored with a leading `/`
    pub fn set_override(&mut self, part: &str, content_type: &str) {
        let part = format!("/{}", part.trim_start_matches('/'));
        self.overrides.insert(part, content_type.to_string());
    }

    /// Content type a consumer would assign to `part`
    pub fn lookup(&self, part: &str) -> Option<&str> {
        let absolute = format!("/{}", part.trim_start_matches('/'));
        self.overrides
            .get(&absolute)
            .or_else(|| {
                let (_, extension) = part.rsplit_once('.')?;
                self.defaults.get(extension)
            })
            .map(String::as_str)
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Types xmlns=\"{}\">",
            namespaces::CT
        );
        for (extension, content_type) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{extension}" ContentType="{content_type}"/>"#
            ));
        }
        for (part, content_type) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}
