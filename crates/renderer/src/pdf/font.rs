//! Standard PDF fonts
//!
//! Only the 14 base fonts every PDF reader ships are used (minus Symbol and
//! ZapfDingbats), so nothing has to be embedded. Text is written in
//! WinAnsiEncoding.

use crate::error::{RenderError, Result};

/// Base font family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

impl FontFamily {
    /// Family for a CSS-style family name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
        match name.to_ascii_lowercase().as_str() {
            "helvetica" | "arial" | "sans-serif" | "sans" => Some(FontFamily::Helvetica),
            "times" | "times new roman" | "times-roman" | "serif" => Some(FontFamily::Times),
            "courier" | "courier new" | "monospace" => Some(FontFamily::Courier),
            _ => None,
        }
    }
}

/// One of the twelve text base fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardFont {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl StandardFont {
    pub const HELVETICA: StandardFont = StandardFont {
        family: FontFamily::Helvetica,
        bold: false,
        italic: false,
    };

    /// Every font in resource order
    pub fn all() -> impl Iterator<Item = StandardFont> {
        [FontFamily::Helvetica, FontFamily::Times, FontFamily::Courier]
            .into_iter()
            .flat_map(|family| {
                [(false, false), (true, false), (false, true), (true, true)]
                    .into_iter()
                    .map(move |(bold, italic)| StandardFont { family, bold, italic })
            })
    }

    /// PostScript name used as `BaseFont`
    pub fn base_font(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (FontFamily::Helvetica, false, false) => "Helvetica",
            (FontFamily::Helvetica, true, false) => "Helvetica-Bold",
            (FontFamily::Helvetica, false, true) => "Helvetica-Oblique",
            (FontFamily::Helvetica, true, true) => "Helvetica-BoldOblique",
            (FontFamily::Times, false, false) => "Times-Roman",
            (FontFamily::Times, true, false) => "Times-Bold",
            (FontFamily::Times, false, true) => "Times-Italic",
            (FontFamily::Times, true, true) => "Times-BoldItalic",
            (FontFamily::Courier, false, false) => "Courier",
            (FontFamily::Courier, true, false) => "Courier-Bold",
            (FontFamily::Courier, false, true) => "Courier-Oblique",
            (FontFamily::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Name of the font in the page resources (`F1` ..= `F12`)
    pub fn resource_name(&self) -> String {
        let family = match self.family {
            FontFamily::Helvetica => 0,
            FontFamily::Times => 1,
            FontFamily::Courier => 2,
        };
        let style = usize::from(self.bold) + 2 * usize::from(self.italic);
        format!("F{}", family * 4 + style + 1)
    }

    /// Advance width of `ch` in thousandths of the font size
    ///
    /// Courier is exact. Helvetica metrics are used for the proportional
    /// families, which is close enough for alignment and line wrapping.
    pub fn char_width(&self, ch: char) -> u16 {
        if self.family == FontFamily::Courier {
            return 600;
        }
        let code = ch as u32;
        if (32..127).contains(&code) {
            HELVETICA_WIDTHS[(code - 32) as usize]
        } else {
            556
        }
    }
}

impl Default for StandardFont {
    fn default() -> Self {
        StandardFont::HELVETICA
    }
}

/// Font selected by a CSS-like font string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub font: StandardFont,
    /// Size in points
    pub size: f32,
}

impl FontSpec {
    /// Parse strings such as `"12pt Helvetica"` or `"bold italic 16px serif"`
    ///
    /// Sizes may be given in `pt`, `px` (0.75pt each) or as a bare number
    /// (points). The family is required.
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || RenderError::InvalidFont(spec.to_string());

        let mut bold = false;
        let mut italic = false;
        let mut size = None;
        let mut family = Vec::new();

        for token in spec.split_whitespace() {
            match token.to_ascii_lowercase().as_str() {
                "bold" => bold = true,
                "italic" | "oblique" => italic = true,
                "normal" => {}
                lower if size.is_none() && family.is_empty() && starts_numeric(lower) => {
                    size = Some(parse_size(lower).ok_or_else(invalid)?);
                }
                _ => family.push(token),
            }
        }

        let family = FontFamily::from_name(&family.join(" ")).ok_or_else(invalid)?;
        let size = size.ok_or_else(invalid)?;

        Ok(FontSpec {
            font: StandardFont { family, bold, italic },
            size,
        })
    }
}

fn starts_numeric(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

fn parse_size(token: &str) -> Option<f32> {
    let (number, factor) = if let Some(n) = token.strip_suffix("pt") {
        (n, 1.0)
    } else if let Some(n) = token.strip_suffix("px") {
        (n, 0.75)
    } else {
        (token, 1.0)
    };
    let size: f32 = number.parse().ok()?;
    (size > 0.0).then_some(size * factor)
}

/// Encode `text` as WinAnsiEncoding bytes; unmappable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => match ch {
                '\u{20AC}' => 0x80,
                '\u{2026}' => 0x85,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '\u{2022}' => 0x95,
                '\u{2013}' => 0x96,
                '\u{2014}' => 0x97,
                '\t' => b' ',
                _ => b'?',
            },
        })
        .collect()
}

// Helvetica advance widths for ASCII 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_font_spec() {
        let spec = FontSpec::parse("bold 16px Arial").unwrap();
        assert_eq!(spec.font.base_font(), "Helvetica-Bold");
        assert_eq!(spec.size, 12.0);

        let spec = FontSpec::parse("italic 10pt Times New Roman").unwrap();
        assert_eq!(spec.font.base_font(), "Times-Italic");
        assert_eq!(spec.size, 10.0);

        let spec = FontSpec::parse("9 monospace").unwrap();
        assert_eq!(spec.font.base_font(), "Courier");
    }

    #[test]
    fn test_parse_font_spec_errors() {
        assert!(FontSpec::parse("12pt Comic Sans").is_err());
        assert!(FontSpec::parse("Helvetica").is_err());
        assert!(FontSpec::parse("0pt Helvetica").is_err());
    }

    #[test]
    fn test_resource_names_are_unique() {
        let names: std::collections::HashSet<String> =
            StandardFont::all().map(|font| font.resource_name()).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(StandardFont::HELVETICA.resource_name(), "F1");
    }

    #[test]
    fn test_widths() {
        let courier = StandardFont {
            family: FontFamily::Courier,
            ..StandardFont::HELVETICA
        };
        assert_eq!(courier.char_width('i'), 600);
        assert_eq!(StandardFont::HELVETICA.char_width('i'), 222);
        assert_eq!(StandardFont::HELVETICA.char_width('W'), 944);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Ægir €"), vec![0xC6, b'g', b'i', b'r', b' ', 0x80]);
        assert_eq!(encode_win_ansi("日"), b"?");
    }
}
