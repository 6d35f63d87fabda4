//! Raw runs and normalized text blocks.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Style flag bit the engine sets on bold runs.
pub const BOLD_FLAG: u32 = 1 << 4;

/// Axis-aligned box in page units, top-down (`y0` is the top edge).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// A single styled run of text as reported by the page source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRun {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    #[serde(default)]
    pub font_name: String,
    /// Engine style flags (bit 4 = bold)
    #[serde(default)]
    pub flags: u32,
    /// Box of the run; missing when the engine could not place it
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

impl RawRun {
    /// Create a run with a known box and no style flags.
    pub fn new(text: impl Into<String>, font_size: f32, font_name: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: font_name.into(),
            flags: 0,
            bbox: Some(bbox),
        }
    }

    /// Set style flags.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Whether the run carries anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// The runs of one visual line, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub runs: Vec<RawRun>,
}

impl RawLine {
    /// Create a line from runs.
    pub fn new(runs: Vec<RawRun>) -> Self {
        Self { runs }
    }
}

/// Bold detection shared by every block: font name or the bold flag bit.
pub fn is_bold(font_name: &str, flags: u32) -> bool {
    font_name.to_lowercase().contains("bold") || flags & BOLD_FLAG != 0
}

/// Ordering key for blocks and headings: page first, then vertical offset.
///
/// Equality and ordering both use the IEEE total order on `y0`.
#[derive(Debug, Clone, Copy)]
pub struct PositionKey {
    pub page: u32,
    pub y0: f32,
}

impl PositionKey {
    /// Create a new position key.
    pub fn new(page: u32, y0: f32) -> Self {
        Self { page, y0 }
    }
}

impl PartialEq for PositionKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PositionKey {}

impl PartialOrd for PositionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PositionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.page
            .cmp(&other.page)
            .then_with(|| self.y0.total_cmp(&other.y0))
    }
}

/// A normalized line of text with unified font and layout metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    /// Trimmed, non-empty line text
    pub text: String,
    /// Largest font size among the line's runs
    pub font_size: f32,
    /// Representative font name
    pub font_name: String,
    /// Representative style flags
    pub flags: u32,
    /// Derived from font name and flags
    pub is_bold: bool,
    /// Union of the line's run boxes
    pub bbox: BoundingBox,
    /// 1-based page number
    pub page: u32,
}

impl TextBlock {
    /// Create a block, deriving `is_bold` from the font name and flags.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        flags: u32,
        bbox: BoundingBox,
        page: u32,
    ) -> Self {
        let font_name = font_name.into();
        Self {
            text: text.into(),
            font_size,
            is_bold: is_bold(&font_name, flags),
            font_name,
            flags,
            bbox,
            page,
        }
    }

    /// Position of the block within the document.
    pub fn position_key(&self) -> PositionKey {
        PositionKey::new(self.page, self.bbox.y0)
    }

    /// Font size relative to the document median.
    pub fn font_ratio(&self, median: f32) -> f32 {
        self.font_size / median
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_union() {
        let a = BoundingBox::new(10.0, 20.0, 50.0, 30.0);
        let b = BoundingBox::new(40.0, 18.0, 90.0, 29.0);
        assert_eq!(a.union(&b), BoundingBox::new(10.0, 18.0, 90.0, 30.0));
        assert_eq!(a.union(&b).width(), 80.0);
    }

    #[test]
    fn test_bold_detection() {
        assert!(is_bold("Helvetica-Bold", 0));
        assert!(is_bold("ARIALBOLD", 0));
        assert!(is_bold("Times-Roman", 16));
        assert!(is_bold("Times-Roman", 16 | 2));
        assert!(!is_bold("Times-Roman", 2));
        assert!(!is_bold("Helvetica-Oblique", 0));
    }

    #[test]
    fn test_position_key_ordering() {
        let a = PositionKey::new(1, 500.0);
        let b = PositionKey::new(2, 10.0);
        let c = PositionKey::new(2, 20.0);
        assert!(a < b);
        assert!(b < c);
        assert_eq!(b.cmp(&PositionKey::new(2, 10.0)), Ordering::Equal);
    }

    #[test]
    fn test_position_key_equality_matches_ordering() {
        let zero = PositionKey::new(1, 0.0);
        let negative_zero = PositionKey::new(1, -0.0);
        assert_ne!(zero, negative_zero);
        assert_ne!(zero.cmp(&negative_zero), Ordering::Equal);

        let nan = PositionKey::new(1, f32::NAN);
        let same = PositionKey::new(1, f32::NAN);
        assert_eq!(nan, same);
        assert_eq!(nan.cmp(&same), Ordering::Equal);
    }

    #[test]
    fn test_raw_run_deserialize_defaults() {
        let run: RawRun = serde_json::from_str(r#"{"text": "Hi", "font_size": 12.0}"#).unwrap();
        assert_eq!(run.flags, 0);
        assert!(run.font_name.is_empty());
        assert!(run.bbox.is_none());
    }
}
