//! Error types for pdfinsight library.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for pdfinsight operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline extraction and ranking.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document could not be opened or has an implausible page count.
    #[error("Invalid document: {0}")]
    Validation(String),

    /// No text carrying a usable font size was found in the document.
    #[error("No text with font size information found")]
    NoText,

    /// Ranking was requested but no document produced any section.
    #[error("No sections extracted from any document")]
    NoSections,

    /// Error reported by the PDF engine while decoding a document.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// The similarity backend failed to score a batch.
    #[error("Similarity backend error: {0}")]
    Similarity(String),

    /// Error during JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// An option value is out of its valid range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

/// The unit of work a partial failure is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unit {
    /// A single page (1-based).
    Page(u32),
    /// A single section, identified by its position and heading text.
    Section { index: usize, title: String },
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Page(n) => write!(f, "page {}", n),
            Unit::Section { index, title } => write!(f, "section {} ({:?})", index, title),
        }
    }
}

/// A failure confined to one page or one section.
///
/// These never fail the enclosing document; they are collected next to the
/// successful output so callers can report both.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    /// Where the failure happened
    pub unit: Unit,
    /// Human-readable cause
    pub message: String,
}

impl UnitFailure {
    /// Create a failure record for a unit.
    pub fn new(unit: Unit, message: impl Into<String>) -> Self {
        Self {
            unit,
            message: message.into(),
        }
    }
}

impl fmt::Display for UnitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.message)
    }
}

/// A value produced despite some of its units failing.
#[derive(Debug, Clone)]
pub struct Partial<T> {
    /// Output assembled from the units that succeeded
    pub value: T,
    /// Units that were skipped
    pub failures: Vec<UnitFailure>,
}

impl<T> Partial<T> {
    /// Wrap a value with no failures.
    pub fn complete(value: T) -> Self {
        Self {
            value,
            failures: Vec::new(),
        }
    }

    /// Whether every unit succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Emit one warning per failed unit, prefixed with the document name.
    pub fn log_failures(&self, document: &str) {
        for failure in &self.failures {
            log::warn!("Partial extraction of {}: {}", document, failure);
        }
    }

    /// Discard failure records, keeping the value.
    pub fn into_value(self) -> T {
        self.value
    }
}
