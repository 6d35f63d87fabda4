//! Title and heading outline types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::PositionKey;

/// Heading level assigned by font ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    /// Pseudo-level for a section built from the document title
    #[serde(rename = "title")]
    Title,
}

impl HeadingLevel {
    /// Label used in output documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::Title => "title",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified heading.
///
/// The position key is captured from the source block when the heading is
/// created and is the only thing headings are ordered by.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
    #[serde(skip)]
    pub position: PositionKey,
}

impl Heading {
    /// Create a heading at the given position.
    pub fn new(level: HeadingLevel, text: impl Into<String>, position: PositionKey) -> Self {
        Self {
            level,
            text: text.into(),
            page: position.page,
            position,
        }
    }
}

/// Outline extracted from a single document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineResult {
    /// Document title (empty when page 1 has no text)
    pub title: String,
    /// Headings in document order
    pub outline: Vec<Heading>,
    /// Provenance, filled in by the orchestration layer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OutlineMetadata>,
}

impl OutlineResult {
    /// Create an outline without metadata.
    pub fn new(title: impl Into<String>, outline: Vec<Heading>) -> Self {
        Self {
            title: title.into(),
            outline,
            metadata: None,
        }
    }

    /// Number of headings.
    pub fn heading_count(&self) -> usize {
        self.outline.len()
    }
}

/// Provenance attached to an outline result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineMetadata {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Wall-clock seconds spent on extraction
    pub processing_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_serialization() {
        assert_eq!(serde_json::to_string(&HeadingLevel::H1).unwrap(), "\"H1\"");
        assert_eq!(
            serde_json::to_string(&HeadingLevel::Title).unwrap(),
            "\"title\""
        );
        assert_eq!(HeadingLevel::H3.to_string(), "H3");
    }

    #[test]
    fn test_heading_json_omits_position() {
        let heading = Heading::new(HeadingLevel::H2, "Methods", PositionKey::new(3, 120.0));
        let json = serde_json::to_string(&heading).unwrap();
        assert_eq!(json, r#"{"level":"H2","text":"Methods","page":3}"#);
    }

    #[test]
    fn test_outline_without_metadata() {
        let outline = OutlineResult::new("Report", vec![]);
        let json = serde_json::to_string(&outline).unwrap();
        assert_eq!(json, r#"{"title":"Report","outline":[]}"#);
    }
}
