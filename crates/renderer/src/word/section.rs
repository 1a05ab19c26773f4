//! Content of a blank Word document

use store::docx::escape_xml;

/// Operations a renderer context accepts for building content directly
pub trait DocumentSink {
    /// Append a paragraph of plain text
    fn add_text(&mut self, text: &str);

    /// Append a heading; levels outside 1..=9 are clamped
    fn add_heading(&mut self, text: &str, level: u8);

    fn add_page_break(&mut self);
}

/// A block-level element of a section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Heading { text: String, level: u8 },
    PageBreak,
}

/// An ordered list of blocks forming the document body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    blocks: Vec<Block>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// WordprocessingML for the `w:body` element
    pub fn to_body_xml(&self) -> String {
        let mut xml = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(text) => {
                    xml.push_str("<w:p>");
                    push_run(&mut xml, text, false);
                    xml.push_str("</w:p>");
                }
                Block::Heading { text, level } => {
                    xml.push_str(&format!(
                        r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>"#
                    ));
                    push_run(&mut xml, text, true);
                    xml.push_str("</w:p>");
                }
                Block::PageBreak => {
                    xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#);
                }
            }
        }
        xml
    }
}

fn push_run(xml: &mut String, text: &str, bold: bool) {
    xml.push_str("<w:r>");
    if bold {
        xml.push_str("<w:rPr><w:b/></w:rPr>");
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&escape_xml(text));
    xml.push_str("</w:t></w:r>");
}

impl DocumentSink for Section {
    fn add_text(&mut self, text: &str) {
        self.blocks.push(Block::Paragraph(text.to_string()));
    }

    fn add_heading(&mut self, text: &str, level: u8) {
        self.blocks.push(Block::Heading {
            text: text.to_string(),
            level: level.clamp(1, 9),
        });
    }

    fn add_page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_section() {
        let section = Section::new();
        assert!(section.is_empty());
        assert_eq!(section.to_body_xml(), "");
    }

    #[test]
    fn test_paragraph_text_is_escaped() {
        let mut section = Section::new();
        section.add_text("a < b & c");
        assert_eq!(
            section.to_body_xml(),
            r#"<w:p><w:r><w:t xml:space="preserve">a &lt; b &amp; c</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_heading_level_clamped() {
        let mut section = Section::new();
        section.add_heading("Title", 0);
        section.add_heading("Deep", 12);

        assert_eq!(
            section.blocks(),
            &[
                Block::Heading { text: "Title".into(), level: 1 },
                Block::Heading { text: "Deep".into(), level: 9 },
            ]
        );
        assert!(section.to_body_xml().contains(r#"<w:pStyle w:val="Heading1"/>"#));
    }

    #[test]
    fn test_page_break() {
        let mut section = Section::new();
        section.add_text("one");
        section.add_page_break();
        section.add_text("two");

        assert_eq!(section.len(), 3);
        assert!(section.to_body_xml().contains(r#"<w:br w:type="page"/>"#));
    }
}
