//! Structure inference: blocks, outline, sections and chunks.

mod chunk;
mod normalize;
mod options;
mod outline;
mod segment;

pub use chunk::{chunk_text, TextChunker};
pub use normalize::BlockNormalizer;
pub use options::{ChunkOptions, FontPolicy, OutlineOptions};
pub use outline::{numbering_pattern, FontStatistics, NumberingPattern, OutlineExtractor};
pub use segment::{normalize_whitespace, SectionSegmenter};
