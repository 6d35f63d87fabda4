//! Page source abstraction layer.
//!
//! Provides a trait-based interface for the text extraction engine,
//! isolating the concrete PDF library (lopdf) from structure inference.
//! The core only ever reads line records and raw page text through
//! [`PageSource`]; it never touches engine types.

mod memory;
#[cfg(feature = "pdf")]
mod pdf;

pub use memory::{MemoryPage, MemorySource};
#[cfg(feature = "pdf")]
pub use pdf::LopdfSource;

use std::fmt;

use md5::{Digest, Md5};

use crate::error::{Error, Result};
use crate::model::RawLine;

/// Opaque identifier of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId {
    /// Display name, usually the file name
    pub name: String,
    /// Content hash of the document bytes, when known
    pub fingerprint: Option<String>,
}

impl DocumentId {
    /// Create an identifier from a name alone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fingerprint: None,
        }
    }

    /// Attach a content fingerprint.
    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Hex-encoded MD5 digest of document bytes.
pub fn fingerprint(data: &[u8]) -> String {
    let digest = Md5::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Abstract interface for the page/text extraction engine.
///
/// Implementations must report `page_count() == 0` for documents they
/// cannot open rather than panicking.
pub trait PageSource: Send + Sync {
    /// Identifier of the document.
    fn id(&self) -> DocumentId;

    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Line records of a page (1-based), each with its runs in source order.
    fn page_lines(&self, page: u32) -> Result<Vec<RawLine>>;

    /// Plain text of a page (1-based), independent of the line records.
    fn page_text(&self, page: u32) -> Result<String>;
}

impl<S: PageSource + ?Sized> PageSource for Box<S> {
    fn id(&self) -> DocumentId {
        (**self).id()
    }

    fn page_count(&self) -> u32 {
        (**self).page_count()
    }

    fn page_lines(&self, page: u32) -> Result<Vec<RawLine>> {
        (**self).page_lines(page)
    }

    fn page_text(&self, page: u32) -> Result<String> {
        (**self).page_text(page)
    }
}

/// Reject documents with no pages or more pages than allowed.
pub fn validate<S: PageSource + ?Sized>(source: &S, max_pages: u32) -> Result<u32> {
    let pages = source.page_count();
    if pages == 0 {
        return Err(Error::Validation(format!("{} has no pages", source.id())));
    }
    if max_pages > 0 && pages > max_pages {
        return Err(Error::Validation(format!(
            "{} has {} pages (limit {})",
            source.id(),
            pages,
            max_pages
        )));
    }
    Ok(pages)
}
