//! Package relationship parts (`.rels`)

use crate::docx::{namespaces, relationship_types, MAIN_DOCUMENT_PART};
use crate::{Result, StoreError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One `<Relationship>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// Relationships of one source part, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root relationships of a package with a single main document part
    pub fn for_document() -> Self {
        let mut rels = Self::new();
        rels.push(relationship_types::DOCUMENT, MAIN_DOCUMENT_PART);
        rels
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        loop {
            match reader.read_event()? {
                Event::Start(element) | Event::Empty(element)
                    if element.local_name().as_ref() == b"Relationship" =>
                {
                    rels.entries.push(Relationship {
                        id: required_attribute(&element, "Id")?,
                        rel_type: required_attribute(&element, "Type")?,
                        target: required_attribute(&element, "Target")?,
                    });
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(rels)
    }

    /// Append a relationship with the next free `rIdN` id, returning the id
    pub fn push(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .entries
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{next}");

        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
        });
        id
    }

    /// First relationship of the given type
    pub fn find_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.entries.iter().find(|rel| rel.rel_type == rel_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">",
            namespaces::PKG_REL
        );
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                rel.id, rel.rel_type, rel.target
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn required_attribute(element: &BytesStart<'_>, name: &str) -> Result<String> {
    element
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == name.as_bytes())
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
        .ok_or_else(|| StoreError::Xml(format!("Relationship without {name} attribute")))
}
