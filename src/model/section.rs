//! Sections and ranking results.

use serde::Serialize;

use super::HeadingLevel;

/// The contiguous text span between one heading and the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// Text of the originating heading
    #[serde(rename = "section_title")]
    pub title: String,
    pub level: HeadingLevel,
    /// First page of the section (1-based)
    #[serde(rename = "page")]
    pub start_page: u32,
    /// Exclusive upper page bound
    #[serde(skip)]
    pub end_page: u32,
    /// Whitespace-normalized text of the covered pages
    #[serde(rename = "text")]
    pub full_text: String,
    /// Overlapping word windows over `full_text`
    pub chunks: Vec<String>,
    /// Identifier of the source document
    pub document: String,
}

/// A section with its relevance score and rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSection {
    #[serde(flatten)]
    pub section: Section,
    pub relevance_score: f64,
    /// 1-based rank after sorting
    #[serde(rename = "importance_rank")]
    pub rank: usize,
}

/// Top-ranked sections across a set of documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    pub extracted_sections: Vec<ScoredSection>,
    /// Number of sections considered before truncation
    pub total_sections: usize,
    /// Documents that produced no sections because extraction failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_documents: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RankingMetadata>,
}

/// Provenance attached to a ranking result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingMetadata {
    pub documents: Vec<String>,
    pub persona: String,
    pub job: String,
    /// Wall-clock seconds spent on extraction and ranking
    pub processing_time: f64,
}
