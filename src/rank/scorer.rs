//! Composite relevance scoring.

use crate::model::{HeadingLevel, Section};

use super::options::{RankOptions, ScoreWeights};

const RESEARCH_QUERY_TERMS: &[&str] = &["data", "methodology", "analysis", "research"];
const RESEARCH_TEXT_TERMS: &[&str] = &["table", "figure", "chart", "graph", "dataset"];
const FINANCE_QUERY_TERMS: &[&str] = &["revenue", "profit", "financial", "earnings"];
const FINANCE_TEXT_TERMS: &[&str] = &["$", "million", "billion", "percentage", "%"];

/// Combines semantic similarity with structural and keyword signals.
#[derive(Debug, Clone, Copy)]
pub struct RelevanceScorer {
    weights: ScoreWeights,
    recency: f64,
}

impl RelevanceScorer {
    pub fn new(weights: ScoreWeights, recency: f64) -> Self {
        Self { weights, recency }
    }

    pub fn from_options(options: &RankOptions) -> Self {
        Self::new(options.weights, options.recency)
    }

    /// Score one section given its precomputed similarity to `query`.
    pub fn score(&self, section: &Section, semantic: f64, query: &str) -> f64 {
        self.weights.semantic * semantic
            + self.weights.level * level_weight(Some(section.level))
            + self.weights.recency * self.recency
            + self.weights.content * content_boost(&section.full_text, query)
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::from_options(&RankOptions::default())
    }
}

/// Structural weight of a heading level; `None` is an unknown level.
pub fn level_weight(level: Option<HeadingLevel>) -> f64 {
    match level {
        Some(HeadingLevel::Title) => 1.2,
        Some(HeadingLevel::H1) => 1.0,
        Some(HeadingLevel::H2) => 0.7,
        Some(HeadingLevel::H3) => 0.4,
        None => 0.5,
    }
}

/// Keyword co-occurrence bonus in `[0, 1]`.
///
/// Matching is case-insensitive substring search on both sides.
pub fn content_boost(text: &str, query: &str) -> f64 {
    let text = text.to_lowercase();
    let query = query.to_lowercase();
    let any = |haystack: &str, needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

    let mut boost = 0.0;
    if any(&query, RESEARCH_QUERY_TERMS) && any(&text, RESEARCH_TEXT_TERMS) {
        boost += 0.3;
    }
    if any(&query, FINANCE_QUERY_TERMS) && any(&text, FINANCE_TEXT_TERMS) {
        boost += 0.2;
    }
    f64::min(boost, 1.0)
}
