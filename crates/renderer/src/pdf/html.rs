//! HTML documents rendered to PDF
//!
//! The HTML is reduced to headings, paragraphs and page breaks (the same
//! blocks a blank Word document holds) and set as wrapped lines of text.
//! `{key.path}` placeholders in the template are filled from bound values
//! before parsing. Header and footer text is repeated on every page;
//! `{PAGENO}` in either is replaced by the page number.

use super::canvas::{Align, Canvas, MultiPage, PdfCanvas};
use super::font::FontFamily;
use super::page::PageSetup;
use crate::error::{RenderError, Result};
use crate::word::{Block, DocumentSink};
use keypath::{render_value, Bindings, KeyPathResolver, PathResolver, Value};
use regex_lite::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use word_template::{key_path_of, PlaceholderScan, TemplateOptions, UnresolvedPolicy};

/// Page margin in millimetres
const MARGIN: f32 = 15.0;
/// Distance of the header and footer baselines from the page edge
const HEADER_OFFSET: f32 = 9.0;
const DEFAULT_FONT_SIZE: f32 = 11.0;

/// Operations an HTML-to-PDF context accepts
pub trait HtmlWriter: MultiPage {
    /// Append an HTML fragment after the template
    fn write_html(&mut self, fragment: &str);

    /// Replace the style sheet
    fn set_styles(&mut self, css: &str);

    /// Text drawn at the top of every page
    fn set_header(&mut self, text: &str);

    /// Text drawn at the bottom of every page
    fn set_footer(&mut self, text: &str);
}

/// An HTML template plus appended fragments, bindings and page decorations
#[derive(Debug, Clone, Default)]
pub struct HtmlDocument {
    template: String,
    template_path: Option<PathBuf>,
    styles: String,
    header: Option<String>,
    footer: Option<String>,
    title: Option<String>,
    fragments: Vec<String>,
    bindings: Bindings,
    options: TemplateOptions,
}

impl HtmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document with `template` as its initial markup
    pub fn from_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    /// Load the template markup from `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        store::ensure_readable(path).map_err(|_| RenderError::TemplateNotReadable(path.to_path_buf()))?;

        let template = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded HTML template {}", path.display());

        Ok(Self {
            template,
            template_path: Some(path.to_path_buf()),
            ..Self::default()
        })
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = template.into();
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template_path.as_deref()
    }

    pub fn styles(&self) -> &str {
        &self.styles
    }

    /// Document title: the explicit one, else the template's `<title>`
    pub fn title(&self) -> Option<String> {
        self.title.clone().or_else(|| {
            title_regex()
                .captures(&self.template)
                .map(|caps| decode_entities(caps[1].trim()))
                .filter(|title| !title.is_empty())
        })
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Bind `value` to `key` for placeholder substitution
    pub fn assign(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.bindings.insert(key, value);
        self
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Template with placeholders filled, followed by the appended fragments
    pub fn markup(&self) -> Result<String> {
        let mut markup = self.fill_placeholders()?;
        for fragment in &self.fragments {
            markup.push_str(fragment);
        }
        Ok(markup)
    }

    /// Blocks of text in document order
    pub fn blocks(&self) -> Result<Vec<Block>> {
        Ok(parse_blocks(&self.markup()?))
    }

    /// Lay the document out on a fresh canvas
    pub fn render(&self, setup: PageSetup) -> Result<PdfCanvas> {
        let blocks = self.blocks()?;
        let style = BodyStyle::from_css(&self.styles);

        let mut canvas = PdfCanvas::new(setup);
        if let Some(title) = self.title() {
            canvas.set_title(title);
        }

        let mut layout = Layout {
            canvas: &mut canvas,
            header: self.header.as_deref(),
            footer: self.footer.as_deref(),
            style,
            y: 0.0,
        };
        layout.new_page()?;
        for block in &blocks {
            layout.place(block)?;
        }

        tracing::debug!(
            "Laid out {} blocks on {} pages",
            blocks.len(),
            canvas.page_number()
        );
        Ok(canvas)
    }

    fn fill_placeholders(&self) -> Result<String> {
        let scan = PlaceholderScan::new(&self.template);
        let mut values: HashMap<&str, String> = HashMap::new();

        for token in scan.distinct() {
            let key_path = key_path_of(token);
            let text = match PathResolver.resolve(key_path, &self.bindings, self.options.case_insensitive) {
                Some(value) => render_value(value),
                None => match self.options.unresolved {
                    UnresolvedPolicy::Blank => {
                        tracing::warn!("No value bound for placeholder {}", token);
                        String::new()
                    }
                    UnresolvedPolicy::Fail => {
                        return Err(word_template::TemplateError::UnresolvedPlaceholder(
                            key_path.to_string(),
                        )
                        .into());
                    }
                },
            };

            let text = if self.options.escape_values {
                store::docx::escape_xml(&text).into_owned()
            } else {
                text
            };
            values.insert(token, text);
        }

        Ok(scan.substitute(&values))
    }
}

impl MultiPage for HtmlDocument {
    fn page_number(&self) -> usize {
        self.blocks()
            .map(|blocks| 1 + blocks.iter().filter(|b| **b == Block::PageBreak).count())
            .unwrap_or(1)
    }

    fn add_page(&mut self) {
        self.fragments.push("<pagebreak />".to_string());
    }
}

impl HtmlWriter for HtmlDocument {
    fn write_html(&mut self, fragment: &str) {
        self.fragments.push(fragment.to_string());
    }

    fn set_styles(&mut self, css: &str) {
        self.styles = css.to_string();
    }

    fn set_header(&mut self, text: &str) {
        self.header = Some(text.to_string());
    }

    fn set_footer(&mut self, text: &str) {
        self.footer = Some(text.to_string());
    }
}

impl DocumentSink for HtmlDocument {
    fn add_text(&mut self, text: &str) {
        self.write_html(&format!("<p>{}</p>", store::docx::escape_xml(text)));
    }

    fn add_heading(&mut self, text: &str, level: u8) {
        let level = level.clamp(1, 6);
        self.write_html(&format!("<h{level}>{}</h{level}>", store::docx::escape_xml(text)));
    }

    fn add_page_break(&mut self) {
        self.add_page();
    }
}

/// Font settings taken from the `body` rule of the style sheet
#[derive(Debug, Clone, Copy, PartialEq)]
struct BodyStyle {
    family: FontFamily,
    size: f32,
}

impl BodyStyle {
    fn from_css(css: &str) -> Self {
        let mut style = BodyStyle {
            family: FontFamily::Helvetica,
            size: DEFAULT_FONT_SIZE,
        };

        let Some(body) = body_rule_regex().captures(css) else {
            return style;
        };
        let declarations = &body[1];

        if let Some(size) = font_size_regex()
            .captures(declarations)
            .and_then(|caps| caps[1].parse::<f32>().ok())
        {
            style.size = size;
        }
        if let Some(family) = font_family_regex()
            .captures(declarations)
            .and_then(|caps| caps[1].split(',').find_map(FontFamily::from_name))
        {
            style.family = family;
        }
        style
    }

    fn font_spec(&self, scale: f32, bold: bool) -> String {
        let family = match self.family {
            FontFamily::Helvetica => "Helvetica",
            FontFamily::Times => "Times",
            FontFamily::Courier => "Courier",
        };
        let weight = if bold { "bold " } else { "" };
        format!("{weight}{}pt {family}", self.size * scale)
    }
}

struct Layout<'a> {
    canvas: &'a mut PdfCanvas,
    header: Option<&'a str>,
    footer: Option<&'a str>,
    style: BodyStyle,
    y: f32,
}

impl Layout<'_> {
    fn place(&mut self, block: &Block) -> Result<()> {
        match block {
            Block::PageBreak => self.new_page(),
            Block::Paragraph(text) => self.place_text(text, 1.0, false),
            Block::Heading { text, level } => self.place_text(text, heading_scale(*level), true),
        }
    }

    fn place_text(&mut self, text: &str, scale: f32, bold: bool) -> Result<()> {
        self.canvas.font(&self.style.font_spec(scale, bold))?;
        let line_height = self.canvas.font_line_height();
        let (width, height) = self.canvas.page_size();
        let bottom = height - MARGIN;

        for line in wrap(self.canvas, text, width - 2.0 * MARGIN) {
            if self.y + line_height > bottom {
                self.new_page()?;
                self.canvas.font(&self.style.font_spec(scale, bold))?;
            }
            self.y += line_height;
            self.canvas.fill_text(&line, MARGIN, self.y, Align::Left);
        }

        // Paragraph spacing
        self.y += line_height / 2.0;
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        self.canvas.add_page();
        let page = self.canvas.page_number().to_string();
        let (width, height) = self.canvas.page_size();

        self.canvas.font(&self.style.font_spec(0.8, false))?;
        if let Some(header) = self.header {
            let text = header.replace("{PAGENO}", &page);
            self.canvas.fill_text(&text, width / 2.0, HEADER_OFFSET, Align::Center);
        }
        if let Some(footer) = self.footer {
            let text = footer.replace("{PAGENO}", &page);
            self.canvas
                .fill_text(&text, width / 2.0, height - HEADER_OFFSET, Align::Center);
        }

        self.y = MARGIN;
        Ok(())
    }
}

fn heading_scale(level: u8) -> f32 {
    match level {
        1 => 2.0,
        2 => 1.5,
        3 => 1.17,
        _ => 1.0,
    }
}

/// Break `text` into lines no wider than `max_width` in the current font
///
/// Words wider than a whole line get a line of their own.
fn wrap(canvas: &PdfCanvas, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if canvas.text_width(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn tag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)[^>]*>").expect("tag pattern compiles"))
}

fn comment_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern compiles"))
}

fn title_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title pattern compiles"))
}

fn body_rule_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?is)\bbody\s*\{([^}]*)\}").expect("body rule pattern compiles"))
}

fn font_size_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)font-size\s*:\s*([0-9.]+)pt").expect("font-size pattern compiles"))
}

fn font_family_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)font-family\s*:\s*([^;]+)").expect("font-family pattern compiles"))
}

/// Reduce HTML to text blocks
///
/// Block-level tags end the current paragraph, `h1`-`h6` become headings,
/// `<pagebreak>` starts a new page. Content of `head`, `style` and `script`
/// is skipped.
pub fn parse_blocks(html: &str) -> Vec<Block> {
    let html = comment_regex().replace_all(html, "");
    let mut blocks = Vec::new();
    let mut text = String::new();
    let mut heading: Option<u8> = None;
    let mut skip_depth = 0usize;
    let mut last = 0;

    let flush = |blocks: &mut Vec<Block>, text: &mut String, heading: Option<u8>| {
        let content = collapse_whitespace(&decode_entities(text));
        text.clear();
        if content.is_empty() {
            return;
        }
        blocks.push(match heading {
            Some(level) => Block::Heading { text: content, level },
            None => Block::Paragraph(content),
        });
    };

    for caps in tag_regex().captures_iter(&html) {
        let Some(tag) = caps.get(0) else { continue };
        if skip_depth == 0 {
            text.push_str(&html[last..tag.start()]);
        }
        last = tag.end();

        let closing = &caps[1] == "/";
        let name = caps[2].to_ascii_lowercase();

        match name.as_str() {
            "head" | "style" | "script" => {
                if closing {
                    skip_depth = skip_depth.saturating_sub(1);
                } else {
                    skip_depth += 1;
                }
            }
            _ if skip_depth > 0 => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                flush(&mut blocks, &mut text, heading);
                heading = if closing {
                    None
                } else {
                    name[1..].parse().ok()
                };
            }
            "pagebreak" => {
                flush(&mut blocks, &mut text, heading);
                blocks.push(Block::PageBreak);
            }
            "p" | "div" | "br" | "li" | "tr" | "table" | "ul" | "ol" | "body" | "section"
            | "blockquote" | "pre" => {
                flush(&mut blocks, &mut text, heading);
            }
            "td" | "th" => text.push(' '),
            _ => {}
        }
    }

    if skip_depth == 0 {
        text.push_str(&html[last..]);
    }
    flush(&mut blocks, &mut text, heading);
    blocks
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace the common named entities and numeric character references
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];

        let decoded = candidate.find(';').and_then(|end| {
            let entity = &candidate[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" | "#39" => Some('\''),
                "nbsp" => Some(' '),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, end + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
