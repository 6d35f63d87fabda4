//! Line-level block normalization.
//!
//! Merges the runs of each line into a single [`TextBlock`] with a unified
//! font size, representative font and bounding box.

use crate::error::{Partial, Unit, UnitFailure};
use crate::model::{BoundingBox, RawLine, RawRun, TextBlock};
use crate::source::PageSource;

use super::options::FontPolicy;

/// Merges raw runs into line-level text blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockNormalizer {
    policy: FontPolicy,
}

impl BlockNormalizer {
    /// Create a normalizer with the given representative font policy.
    pub fn new(policy: FontPolicy) -> Self {
        Self { policy }
    }

    /// Merge one line's runs into a block.
    ///
    /// Whitespace-only runs are ignored. Returns `None` when no text remains
    /// after trimming or no run carried a bounding box.
    pub fn normalize_line(&self, line: &RawLine, page: u32) -> Option<TextBlock> {
        let mut text = String::new();
        let mut font_size: f32 = 0.0;
        let mut bbox: Option<BoundingBox> = None;
        let mut representative: Option<&RawRun> = None;

        for run in line.runs.iter().filter(|r| r.has_text()) {
            text.push_str(&run.text);

            representative = match (self.policy, representative) {
                (FontPolicy::LargestRun, Some(current)) if run.font_size <= current.font_size => {
                    Some(current)
                }
                _ => Some(run),
            };
            font_size = font_size.max(run.font_size);

            if let Some(run_box) = &run.bbox {
                bbox = Some(match bbox {
                    Some(b) => b.union(run_box),
                    None => *run_box,
                });
            }
        }

        let text = text.trim();
        let (bbox, representative) = match (bbox, representative) {
            (Some(b), Some(r)) if !text.is_empty() => (b, r),
            _ => return None,
        };

        Some(TextBlock::new(
            text,
            font_size,
            representative.font_name.clone(),
            representative.flags,
            bbox,
            page,
        ))
    }

    /// Normalize every line of one page.
    pub fn normalize_page(&self, lines: &[RawLine], page: u32) -> Vec<TextBlock> {
        lines
            .iter()
            .filter_map(|line| self.normalize_line(line, page))
            .collect()
    }

    /// Normalize a whole document, page by page.
    ///
    /// A page whose line records cannot be read is skipped and reported in
    /// the failure list; blocks from the other pages are still returned.
    pub fn normalize_document<S: PageSource + ?Sized>(&self, source: &S) -> Partial<Vec<TextBlock>> {
        let mut blocks = Vec::new();
        let mut failures = Vec::new();

        for page in 1..=source.page_count() {
            match source.page_lines(page) {
                Ok(lines) => blocks.extend(self.normalize_page(&lines, page)),
                Err(e) => failures.push(UnitFailure::new(Unit::Page(page), e.to_string())),
            }
        }

        log::debug!(
            "Normalized {} blocks from {} ({} pages failed)",
            blocks.len(),
            source.id(),
            failures.len()
        );

        Partial {
            value: blocks,
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::BOLD_FLAG;
    use crate::source::DocumentId;

    fn run(text: &str, size: f32, font: &str, x0: f32, x1: f32) -> RawRun {
        RawRun::new(text, size, font, BoundingBox::new(x0, 100.0, x1, 100.0 + size))
    }

    #[test]
    fn test_merge_runs_into_block() {
        let line = RawLine::new(vec![
            run("1. ", 12.0, "Arial", 72.0, 84.0),
            run("Introduction", 14.0, "Arial", 84.0, 160.0),
        ]);
        let block = BlockNormalizer::default().normalize_line(&line, 2).unwrap();

        assert_eq!(block.text, "1. Introduction");
        assert_eq!(block.font_size, 14.0);
        assert_eq!(block.page, 2);
        assert_eq!(block.bbox, BoundingBox::new(72.0, 100.0, 160.0, 114.0));
    }

    #[test]
    fn test_whitespace_runs_are_discarded() {
        let line = RawLine::new(vec![
            run("   ", 30.0, "Arial-Bold", 0.0, 500.0),
            run("Body", 10.0, "Arial", 72.0, 100.0),
        ]);
        let block = BlockNormalizer::default().normalize_line(&line, 1).unwrap();

        assert_eq!(block.text, "Body");
        assert_eq!(block.font_size, 10.0);
        assert!(!block.is_bold);
        assert_eq!(block.bbox.x0, 72.0);
    }

    #[test]
    fn test_last_run_supplies_font() {
        let line = RawLine::new(vec![
            run("Note: ", 12.0, "Arial-Bold", 72.0, 100.0),
            run("plain text", 12.0, "Arial", 100.0, 160.0),
        ]);
        let block = BlockNormalizer::new(FontPolicy::LastRun)
            .normalize_line(&line, 1)
            .unwrap();

        assert_eq!(block.font_name, "Arial");
        assert!(!block.is_bold);
    }

    #[test]
    fn test_largest_run_supplies_font() {
        let line = RawLine::new(vec![
            run("Chapter", 18.0, "Arial-Bold", 72.0, 140.0),
            run(" one", 12.0, "Arial", 140.0, 170.0),
        ]);
        let block = BlockNormalizer::new(FontPolicy::LargestRun)
            .normalize_line(&line, 1)
            .unwrap();

        assert_eq!(block.font_name, "Arial-Bold");
        assert!(block.is_bold);
    }

    #[test]
    fn test_bold_flag_from_last_run() {
        let line = RawLine::new(vec![
            run("Plain", 12.0, "Times", 72.0, 100.0),
            run("Flagged", 12.0, "Times", 100.0, 140.0).with_flags(BOLD_FLAG),
        ]);
        let block = BlockNormalizer::default().normalize_line(&line, 1).unwrap();
        assert!(block.is_bold);
        assert_eq!(block.flags, BOLD_FLAG);
    }

    #[test]
    fn test_line_without_box_is_dropped() {
        let mut r = run("Floating", 12.0, "Arial", 0.0, 10.0);
        r.bbox = None;
        let line = RawLine::new(vec![r]);
        assert!(BlockNormalizer::default().normalize_line(&line, 1).is_none());

        let empty = RawLine::new(vec![run(" \t", 12.0, "Arial", 0.0, 10.0)]);
        assert!(BlockNormalizer::default().normalize_line(&empty, 1).is_none());
    }

    struct FlakySource;

    impl PageSource for FlakySource {
        fn id(&self) -> DocumentId {
            DocumentId::new("flaky.pdf")
        }

        fn page_count(&self) -> u32 {
            3
        }

        fn page_lines(&self, page: u32) -> Result<Vec<RawLine>> {
            if page == 2 {
                return Err(Error::PdfParse("bad content stream".to_string()));
            }
            Ok(vec![RawLine::new(vec![run("Line", 12.0, "Arial", 72.0, 100.0)])])
        }

        fn page_text(&self, _page: u32) -> Result<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_bad_page_does_not_abort_document() {
        let partial = BlockNormalizer::default().normalize_document(&FlakySource);

        assert_eq!(partial.value.len(), 2);
        assert_eq!(partial.value[0].page, 1);
        assert_eq!(partial.value[1].page, 3);
        assert_eq!(partial.failures.len(), 1);
        assert_eq!(partial.failures[0].unit, Unit::Page(2));
    }
}
