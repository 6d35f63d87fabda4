//! Ranking configuration.

use std::time::Duration;

use crate::structure::{ChunkOptions, OutlineOptions};

/// Weights of the composite relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub semantic: f64,
    pub level: f64,
    pub recency: f64,
    pub content: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: 0.55,
            level: 0.25,
            recency: 0.15,
            content: 0.05,
        }
    }
}

/// Options for section ranking.
#[derive(Debug, Clone)]
pub struct RankOptions {
    /// Composite score weights
    pub weights: ScoreWeights,

    /// Fixed recency sub-score; no document date signal is modeled
    pub recency: f64,

    /// Number of sections kept in the result
    pub top_k: usize,

    /// Word windows for section chunks
    pub chunk: ChunkOptions,

    /// Outline extraction applied to every ranked document
    pub outline: OutlineOptions,

    /// Advisory time budget for one ranking batch
    pub time_budget: Duration,
}

impl RankOptions {
    /// Create new ranking options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score weights.
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set the constant recency sub-score.
    pub fn with_recency(mut self, recency: f64) -> Self {
        self.recency = recency;
        self
    }

    /// Set how many sections to keep.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the chunking options.
    pub fn with_chunk(mut self, chunk: ChunkOptions) -> Self {
        self.chunk = chunk;
        self
    }

    /// Set the outline extraction options.
    pub fn with_outline(mut self, outline: OutlineOptions) -> Self {
        self.outline = outline;
        self
    }

    /// Set the advisory time budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            recency: 0.5,
            top_k: 10,
            chunk: ChunkOptions::default(),
            outline: OutlineOptions::default(),
            time_budget: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = ScoreWeights::default();
        assert!((w.semantic + w.level + w.recency + w.content - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_options_builder() {
        let options = RankOptions::new().with_top_k(3).with_recency(0.0);
        assert_eq!(options.top_k, 3);
        assert_eq!(options.recency, 0.0);
        assert_eq!(options.chunk, ChunkOptions::default());
        assert_eq!(options.time_budget, Duration::from_secs(60));
    }
}
