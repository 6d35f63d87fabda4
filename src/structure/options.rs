//! Structure inference options and configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Options for outline extraction.
#[derive(Debug, Clone)]
pub struct OutlineOptions {
    /// Minimum font ratio for a page-1 block to be a title candidate
    pub title_ratio: f32,

    /// Minimum font ratio for the size criterion of heading candidacy
    pub heading_ratio: f32,

    /// Minimum font ratio for an H1 heading
    pub h1_ratio: f32,

    /// Minimum font ratio for an H2 heading
    pub h2_ratio: f32,

    /// Left offset beyond which a block counts as centered/indented
    pub indent_threshold: f32,

    /// Minimum share of uppercase characters for the capitalization criterion
    pub uppercase_ratio: f32,

    /// Minimum character count for the capitalization criterion
    pub min_uppercase_len: usize,

    /// How a merged line picks its representative font
    pub font_policy: FontPolicy,

    /// Maximum page count accepted (0 = unlimited)
    pub max_pages: u32,

    /// Advisory per-document time budget
    pub time_budget: Duration,
}

impl OutlineOptions {
    /// Create new outline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title font ratio threshold.
    pub fn with_title_ratio(mut self, ratio: f32) -> Self {
        self.title_ratio = ratio;
        self
    }

    /// Set the heading candidacy font ratio threshold.
    pub fn with_heading_ratio(mut self, ratio: f32) -> Self {
        self.heading_ratio = ratio;
        self
    }

    /// Set the H1 and H2 font ratio thresholds.
    pub fn with_level_ratios(mut self, h1: f32, h2: f32) -> Self {
        self.h1_ratio = h1;
        self.h2_ratio = h2;
        self
    }

    /// Set the indentation threshold.
    pub fn with_indent_threshold(mut self, threshold: f32) -> Self {
        self.indent_threshold = threshold;
        self
    }

    /// Set the representative font policy.
    pub fn with_font_policy(mut self, policy: FontPolicy) -> Self {
        self.font_policy = policy;
        self
    }

    /// Set the maximum accepted page count.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set the advisory time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            title_ratio: 1.8,
            heading_ratio: 1.0,
            h1_ratio: 1.4,
            h2_ratio: 1.2,
            indent_threshold: 100.0,
            uppercase_ratio: 0.7,
            min_uppercase_len: 3,
            font_policy: FontPolicy::LastRun,
            max_pages: 50,
            time_budget: Duration::from_secs(10),
        }
    }
}

/// Which run of a merged line supplies its font name and style flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontPolicy {
    /// The last non-empty run
    #[default]
    LastRun,
    /// The run with the largest font size (first one on ties)
    LargestRun,
}

/// Options for splitting section text into word windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Words per window
    pub max_tokens: usize,

    /// Words shared by consecutive windows
    pub overlap: usize,
}

impl ChunkOptions {
    /// Create chunk options, validating `overlap < max_tokens`.
    pub fn new(max_tokens: usize, overlap: usize) -> Result<Self> {
        let options = Self {
            max_tokens,
            overlap,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check that the window advances.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(Error::InvalidOption("max_tokens must be positive".to_string()));
        }
        if self.overlap >= self.max_tokens {
            return Err(Error::InvalidOption(format!(
                "overlap ({}) must be smaller than max_tokens ({})",
                self.overlap, self.max_tokens
            )));
        }
        Ok(())
    }

    /// Distance between consecutive window starts.
    pub fn stride(&self) -> usize {
        self.max_tokens - self.overlap
    }
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_tokens: 200,
            overlap: 50,
        }
    }
}
