//! In-memory page source.
//!
//! Holds pre-extracted line records. Used by tests and for `*.lines.json`
//! dumps produced by other extraction engines.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DocumentId, PageSource};
use crate::error::{Error, Result};
use crate::model::RawLine;

/// One page of pre-extracted content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    /// Line records in source order
    #[serde(default)]
    pub lines: Vec<RawLine>,
    /// Raw page text; derived from the lines when absent
    #[serde(default)]
    pub text: Option<String>,
}

impl MemoryPage {
    fn derived_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                line.runs
                    .iter()
                    .map(|run| run.text.as_str())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A document held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub pages: Vec<MemoryPage>,
}

impl MemorySource {
    /// Create an empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fingerprint: None,
            pages: Vec::new(),
        }
    }

    /// Append a page whose text is derived from its lines.
    pub fn with_page(mut self, lines: Vec<RawLine>) -> Self {
        self.pages.push(MemoryPage { lines, text: None });
        self
    }

    /// Append a page with explicit raw text.
    pub fn with_page_text(mut self, lines: Vec<RawLine>, text: impl Into<String>) -> Self {
        self.pages.push(MemoryPage {
            lines,
            text: Some(text.into()),
        });
        self
    }

    /// Parse a JSON line dump.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Validation(format!("Invalid line dump: {}", e)))
    }

    /// Load a JSON line dump from disk, fingerprinting the file bytes.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let text = String::from_utf8_lossy(&data);
        let mut source = Self::from_json(&text)?;
        if source.name.is_empty() {
            source.name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
        }
        if source.fingerprint.is_none() {
            source.fingerprint = Some(super::fingerprint(&data));
        }
        Ok(source)
    }

    fn page(&self, page: u32) -> Result<&MemoryPage> {
        if page == 0 {
            return Err(Error::PageOutOfRange(page, self.page_count()));
        }
        self.pages
            .get((page - 1) as usize)
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }
}

impl PageSource for MemorySource {
    fn id(&self) -> DocumentId {
        DocumentId {
            name: self.name.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_lines(&self, page: u32) -> Result<Vec<RawLine>> {
        Ok(self.page(page)?.lines.clone())
    }

    fn page_text(&self, page: u32) -> Result<String> {
        let page = self.page(page)?;
        Ok(page.text.clone().unwrap_or_else(|| page.derived_text()))
    }
}
