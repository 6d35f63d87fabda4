//! Relevance scoring and cross-document ranking.

mod options;
mod ranker;
mod scorer;
mod similarity;

pub use options::{RankOptions, ScoreWeights};
pub use ranker::SectionRanker;
pub use scorer::{content_boost, level_weight, RelevanceScorer};
pub use similarity::{
    cosine, select_backend, term_counts, Embedder, EmbeddingSimilarity, SimilarityBackend,
    TfIdfSimilarity,
};
