//! Title and heading classification.
//!
//! Headings are detected from the document's font size distribution plus a
//! handful of layout and lexical cues. Everything is relative to the median
//! font size, so documents typeset at any base size classify the same way.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Heading, HeadingLevel, OutlineResult, TextBlock};

use super::options::OutlineOptions;

/// Font size statistics over the blocks of one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontStatistics {
    pub median: f32,
    pub mean: f32,
    /// Sample standard deviation (1.0 when only one size was observed)
    pub std_dev: f32,
    /// Number of blocks with a positive font size
    pub count: usize,
}

impl FontStatistics {
    /// Compute statistics over blocks with a positive font size.
    ///
    /// Returns `None` when no block carries a usable size.
    pub fn from_blocks(blocks: &[TextBlock]) -> Option<Self> {
        let mut sizes: Vec<f32> = blocks
            .iter()
            .map(|b| b.font_size)
            .filter(|s| *s > 0.0)
            .collect();
        if sizes.is_empty() {
            return None;
        }
        sizes.sort_by(|a, b| a.total_cmp(b));

        let count = sizes.len();
        let mid = count / 2;
        let median = if count % 2 == 1 {
            sizes[mid]
        } else {
            (sizes[mid - 1] + sizes[mid]) / 2.0
        };

        let mean = sizes.iter().sum::<f32>() / count as f32;
        let std_dev = if count > 1 {
            let var = sizes.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / (count - 1) as f32;
            var.sqrt()
        } else {
            1.0
        };

        Some(Self {
            median,
            mean,
            std_dev,
            count,
        })
    }
}

/// Numbered heading prefixes, in match order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingPattern {
    /// `1.`
    Dotted,
    /// `1 Introduction`
    Spaced,
    /// `A.`
    Lettered,
    /// `1.1`
    Decimal,
}

fn numbering_patterns() -> &'static [(NumberingPattern, Regex)] {
    static PATTERNS: OnceLock<Vec<(NumberingPattern, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (NumberingPattern::Dotted, r"^\d+\."),
            (NumberingPattern::Spaced, r"^\d+\s+[A-Z]"),
            (NumberingPattern::Lettered, r"^[A-Z]\."),
            (NumberingPattern::Decimal, r"^\d+\.\d+"),
        ]
        .into_iter()
        .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid numbering regex")))
        .collect()
    })
}

/// First numbering pattern the text starts with.
pub fn numbering_pattern(text: &str) -> Option<NumberingPattern> {
    numbering_patterns()
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(kind, _)| *kind)
}

/// Classifies blocks into a title and a leveled heading list.
#[derive(Debug, Clone, Default)]
pub struct OutlineExtractor {
    options: OutlineOptions,
}

impl OutlineExtractor {
    /// Create an extractor with the given options.
    pub fn new(options: OutlineOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &OutlineOptions {
        &self.options
    }

    /// Extract the title and ordered headings from a document's blocks.
    pub fn extract(&self, blocks: &[TextBlock]) -> Result<OutlineResult> {
        let stats = FontStatistics::from_blocks(blocks).ok_or(Error::NoText)?;
        log::debug!(
            "Font statistics: median={:.2} mean={:.2} std={:.2} over {} blocks",
            stats.median,
            stats.mean,
            stats.std_dev,
            stats.count
        );

        let title = self.select_title(blocks, stats.median);
        let outline = self.extract_headings(blocks, stats.median);
        Ok(OutlineResult::new(title, outline))
    }

    /// Pick the topmost large-font block on page 1.
    ///
    /// Falls back to the largest-font block on page 1 when none reaches the
    /// title ratio; returns an empty string when page 1 has no blocks.
    pub fn select_title(&self, blocks: &[TextBlock], median: f32) -> String {
        let first_page: Vec<&TextBlock> = blocks.iter().filter(|b| b.page == 1).collect();

        let mut candidates: Vec<&TextBlock> = first_page
            .iter()
            .copied()
            .filter(|b| b.font_ratio(median) >= self.options.title_ratio)
            .collect();

        if candidates.is_empty() {
            // First block wins among equal sizes
            let largest = first_page.iter().copied().fold(None, |best: Option<&TextBlock>, b| {
                match best {
                    Some(cur) if b.font_size <= cur.font_size => Some(cur),
                    _ => Some(b),
                }
            });
            candidates.extend(largest);
        }

        candidates
            .into_iter()
            .fold(None, |best: Option<&TextBlock>, b| match best {
                Some(cur) if b.bbox.y0 >= cur.bbox.y0 => Some(cur),
                _ => Some(b),
            })
            .map(|b| b.text.clone())
            .unwrap_or_default()
    }

    /// Classify every heading candidate and order by position.
    pub fn extract_headings(&self, blocks: &[TextBlock], median: f32) -> Vec<Heading> {
        let mut headings: Vec<Heading> = blocks
            .iter()
            .filter(|b| self.is_heading_candidate(b, median))
            .map(|b| Heading::new(self.heading_level(b, median), b.text.clone(), b.position_key()))
            .collect();

        headings.sort_by(|a, b| a.position.cmp(&b.position));
        headings
    }

    /// Whether any heading criterion holds for the block.
    pub fn is_heading_candidate(&self, block: &TextBlock, median: f32) -> bool {
        block.font_ratio(median) >= self.options.heading_ratio
            || block.is_bold
            || self.is_indented(block)
            || self.is_capitalized(&block.text)
            || numbering_pattern(&block.text).is_some()
    }

    /// Level from the font ratio against the document median.
    pub fn heading_level(&self, block: &TextBlock, median: f32) -> HeadingLevel {
        let ratio = block.font_ratio(median);
        if ratio >= self.options.h1_ratio {
            HeadingLevel::H1
        } else if ratio >= self.options.h2_ratio {
            HeadingLevel::H2
        } else {
            HeadingLevel::H3
        }
    }

    /// Centered or indented text starts past the indent threshold.
    pub fn is_indented(&self, block: &TextBlock) -> bool {
        block.bbox.x0 > self.options.indent_threshold
    }

    /// Mostly uppercase text of a minimum length.
    pub fn is_capitalized(&self, text: &str) -> bool {
        let len = text.chars().count();
        if len < self.options.min_uppercase_len || len == 0 {
            return false;
        }
        let upper = text.chars().filter(|c| c.is_uppercase()).count();
        upper as f32 / len as f32 >= self.options.uppercase_ratio
    }
}
