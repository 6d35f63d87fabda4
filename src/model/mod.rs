//! Document model types for outline extraction and section ranking.
//!
//! This module defines the intermediate representation that bridges the
//! page source (raw positioned text runs) and the structure/ranking stages.
//! The model is engine-agnostic: any source that can report runs with font
//! metadata produces the same blocks, headings and sections.

mod block;
mod outline;
mod section;

pub use block::{is_bold, BoundingBox, PositionKey, RawLine, RawRun, TextBlock, BOLD_FLAG};
pub use outline::{Heading, HeadingLevel, OutlineMetadata, OutlineResult};
pub use section::{RankingMetadata, RankingResult, ScoredSection, Section};
