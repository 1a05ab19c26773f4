//! Drawing surface for PDF pages
//!
//! Coordinates are millimetres from the top-left corner of the page, as in
//! an HTML canvas. They are converted to PDF user space (points, origin at
//! the bottom-left) when operations are recorded.

use super::font::{encode_win_ansi, FontSpec, StandardFont};
use super::page::{PageSetup, PT_PER_MM};
use crate::error::{RenderError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::io::Write;

/// Documents made of numbered pages
pub trait MultiPage {
    /// Number of the current page, starting at 1; 0 before the first page
    fn page_number(&self) -> usize;

    /// Start a new page and make it current
    fn add_page(&mut self);
}

/// Horizontal placement of text relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Text starts at the anchor
    #[default]
    Left,
    /// Text ends at the anchor
    Right,
    /// Text is centred on the anchor
    Center,
}

/// An RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    /// Parse `#rgb`, `#rrggbb` or `rgb(r, g, b)` with 0-255 components
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || RenderError::InvalidColor(value.to_string());
        let trimmed = value.trim();

        let channels: Vec<u8> = if let Some(hex) = trimmed.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|c| c.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            match digits.len() {
                3 => digits.iter().map(|d| d * 17).collect(),
                6 => digits.chunks(2).map(|pair| pair[0] * 16 + pair[1]).collect(),
                _ => return Err(invalid()),
            }
        } else if let Some(inner) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            inner
                .split(',')
                .map(|part| part.trim().parse::<u8>().ok())
                .collect::<Option<_>>()
                .ok_or_else(invalid)?
        } else {
            return Err(invalid());
        };

        match channels.as_slice() {
            [r, g, b] => Ok(Color {
                r: f32::from(*r) / 255.0,
                g: f32::from(*g) / 255.0,
                b: f32::from(*b) / 255.0,
            }),
            _ => Err(invalid()),
        }
    }

    fn operands(&self) -> Vec<Object> {
        vec![self.r.into(), self.g.into(), self.b.into()]
    }
}

/// Drawing operations a PDF context accepts
///
/// Lengths are millimetres. Style changes apply to everything drawn after
/// them until the context is restored.
pub trait Canvas: MultiPage {
    /// Color used by `fill_text` and `fill`
    fn fill_style(&mut self, color: &str) -> Result<()>;

    /// Color used by `stroke`
    fn stroke_style(&mut self, color: &str) -> Result<()>;

    fn line_width(&mut self, width: f32);

    /// Draw one line of text with its baseline at `y`
    fn fill_text(&mut self, text: &str, x: f32, y: f32, align: Align);

    /// Discard the current path
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f32, y: f32);

    /// Extend the path with a straight line; starts the path if there is none
    fn line_to(&mut self, x: f32, y: f32);

    fn close_path(&mut self);

    fn stroke(&mut self);

    fn fill(&mut self);

    /// Push the graphics state (colors, line width, font)
    fn save_context(&mut self);

    /// Pop the state pushed by the matching `save_context`
    fn restore_context(&mut self);

    /// Select a font from a string such as `"bold 12pt Helvetica"`
    fn font(&mut self, spec: &str) -> Result<()>;

    fn set_font_line_height(&mut self, line_height: f32);

    /// Distance between baselines for the current font
    fn font_line_height(&self) -> f32;

    /// Width of `text` in the current font
    fn text_width(&self, text: &str) -> f32;
}

#[derive(Debug, Clone, PartialEq)]
struct GraphicsState {
    fill: Color,
    stroke: Color,
    line_width: f32,
    font: FontSpec,
    line_height: Option<f32>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 0.2,
            font: FontSpec {
                font: StandardFont::HELVETICA,
                size: 12.0,
            },
            line_height: None,
        }
    }
}

/// A [`Canvas`] that records page content and writes it with `lopdf`
#[derive(Debug, Clone)]
pub struct PdfCanvas {
    setup: PageSetup,
    title: Option<String>,
    pages: Vec<Vec<Operation>>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    has_point: bool,
}

impl PdfCanvas {
    pub fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            title: None,
            pages: Vec::new(),
            state: GraphicsState::default(),
            saved: Vec::new(),
            has_point: false,
        }
    }

    pub fn page_setup(&self) -> PageSetup {
        self.setup
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Title written to the document information dictionary
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Width and height of a page in millimetres
    pub fn page_size(&self) -> (f32, f32) {
        self.setup.size_mm()
    }

    /// Recorded operations of page `number` (1-based)
    pub fn page_operations(&self, number: usize) -> Option<&[Operation]> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(Vec::as_slice)
    }

    /// Build the PDF document
    ///
    /// A canvas without pages produces a single empty page.
    pub fn to_document(&self) -> Result<Document> {
        let (width, height) = self.setup.size_pt();
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in StandardFont::all() {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let empty = [Vec::new()];
        let pages = if self.pages.is_empty() {
            &empty[..]
        } else {
            &self.pages[..]
        };

        let mut page_ids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content {
                operations: operations.clone(),
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.0.into(), 0.0.into(), width.into(), height.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            page_ids.push(page_id.into());
        }

        let count = page_ids.len() as i64;
        doc.objects.insert(
            pages_id,
            dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids,
                "Count" => count,
            }
            .into(),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = self.add_info(&mut doc);
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }

    /// Serialize the document into `writer`, returning the number of bytes
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut doc = self.to_document()?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }

    fn add_info(&self, doc: &mut Document) -> ObjectId {
        let mut info = dictionary! {
            "Producer" => Object::string_literal("docrender"),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(encode_win_ansi(title)));
        }
        doc.add_object(info)
    }

    fn x_pt(&self, x: f32) -> f32 {
        x * PT_PER_MM
    }

    fn y_pt(&self, y: f32) -> f32 {
        let (_, height) = self.setup.size_pt();
        height - y * PT_PER_MM
    }

    /// Operations of the current page, starting one if needed
    fn current_page(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.add_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn emit(&mut self, operator: &str, operands: Vec<Object>) {
        self.current_page().push(Operation::new(operator, operands));
    }

    /// Emit only when a page exists; new pages replay the state themselves
    fn emit_state(&mut self, operator: &str, operands: Vec<Object>) {
        if let Some(page) = self.pages.last_mut() {
            page.push(Operation::new(operator, operands));
        }
    }

    fn state_operations(state: &GraphicsState) -> Vec<Operation> {
        vec![
            Operation::new("rg", state.fill.operands()),
            Operation::new("RG", state.stroke.operands()),
            Operation::new("w", vec![(state.line_width * PT_PER_MM).into()]),
        ]
    }
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new(PageSetup::default())
    }
}

impl MultiPage for PdfCanvas {
    fn page_number(&self) -> usize {
        self.pages.len()
    }

    fn add_page(&mut self) {
        // q/Q must balance within a page, so close open levels and reopen them
        if let Some(page) = self.pages.last_mut() {
            page.extend(self.saved.iter().map(|_| Operation::new("Q", vec![])));
        }

        let mut operations = Vec::new();
        for state in &self.saved {
            operations.extend(Self::state_operations(state));
            operations.push(Operation::new("q", vec![]));
        }
        operations.extend(Self::state_operations(&self.state));

        self.pages.push(operations);
        self.has_point = false;
        tracing::debug!("Started PDF page {}", self.pages.len());
    }
}

impl Canvas for PdfCanvas {
    fn fill_style(&mut self, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        self.state.fill = color;
        self.emit_state("rg", color.operands());
        Ok(())
    }

    fn stroke_style(&mut self, color: &str) -> Result<()> {
        let color = Color::parse(color)?;
        self.state.stroke = color;
        self.emit_state("RG", color.operands());
        Ok(())
    }

    fn line_width(&mut self, width: f32) {
        self.state.line_width = width;
        self.emit_state("w", vec![(width * PT_PER_MM).into()]);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, align: Align) {
        let x = match align {
            Align::Left => x,
            Align::Right => x - self.text_width(text),
            Align::Center => x - self.text_width(text) / 2.0,
        };
        let (x, y) = (self.x_pt(x), self.y_pt(y));
        let FontSpec { font, size } = self.state.font;

        let page = self.current_page();
        page.push(Operation::new("BT", vec![]));
        page.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource_name().into_bytes()), size.into()],
        ));
        page.push(Operation::new("Td", vec![x.into(), y.into()]));
        page.push(Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ));
        page.push(Operation::new("ET", vec![]));
    }

    fn begin_path(&mut self) {
        if self.has_point {
            self.emit("n", vec![]);
        }
        self.has_point = false;
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = (self.x_pt(x), self.y_pt(y));
        self.emit("m", vec![x.into(), y.into()]);
        self.has_point = true;
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if !self.has_point {
            self.move_to(x, y);
            return;
        }
        let (x, y) = (self.x_pt(x), self.y_pt(y));
        self.emit("l", vec![x.into(), y.into()]);
    }

    fn close_path(&mut self) {
        if self.has_point {
            self.emit("h", vec![]);
        }
    }

    fn stroke(&mut self) {
        if self.has_point {
            self.emit("S", vec![]);
            self.has_point = false;
        }
    }

    fn fill(&mut self) {
        if self.has_point {
            self.emit("f", vec![]);
            self.has_point = false;
        }
    }

    fn save_context(&mut self) {
        self.saved.push(self.state.clone());
        self.emit("q", vec![]);
    }

    fn restore_context(&mut self) {
        match self.saved.pop() {
            Some(state) => {
                self.state = state;
                self.emit("Q", vec![]);
            }
            None => tracing::warn!("restore_context called without a saved context"),
        }
    }

    fn font(&mut self, spec: &str) -> Result<()> {
        self.state.font = FontSpec::parse(spec)?;
        Ok(())
    }

    fn set_font_line_height(&mut self, line_height: f32) {
        self.state.line_height = Some(line_height);
    }

    fn font_line_height(&self) -> f32 {
        self.state
            .line_height
            .unwrap_or(self.state.font.size * 1.2 / PT_PER_MM)
    }

    fn text_width(&self, text: &str) -> f32 {
        let FontSpec { font, size } = self.state.font;
        let units: u32 = text.chars().map(|ch| u32::from(font.char_width(ch))).sum();
        units as f32 * size / 1000.0 / PT_PER_MM
    }
}
