//! Page geometry

use serde::{Deserialize, Serialize};

/// Points per millimetre
pub const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageFormat {
    /// Portrait width and height in millimetres
    pub fn size_mm(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A5 => (148.0, 210.0),
            PageFormat::Letter => (215.9, 279.4),
            PageFormat::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Format and orientation of every page in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSetup {
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageSetup {
    pub fn new(format: PageFormat, orientation: Orientation) -> Self {
        Self { format, orientation }
    }

    /// Width and height in millimetres
    pub fn size_mm(&self) -> (f32, f32) {
        let (width, height) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }

    /// Width and height in points
    pub fn size_pt(&self) -> (f32, f32) {
        let (width, height) = self.size_mm();
        (width * PT_PER_MM, height * PT_PER_MM)
    }
}
