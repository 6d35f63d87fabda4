//! Section segmentation between consecutive headings.

use std::collections::HashMap;

use crate::error::{Partial, Unit, UnitFailure};
use crate::model::{Heading, Section};
use crate::source::PageSource;

use super::chunk::TextChunker;

/// Partitions a document's pages into sections bounded by headings.
#[derive(Debug, Clone, Default)]
pub struct SectionSegmenter {
    chunker: TextChunker,
}

impl SectionSegmenter {
    /// Create a segmenter that chunks section text with `chunker`.
    pub fn new(chunker: TextChunker) -> Self {
        Self { chunker }
    }

    /// Build one section per heading, in heading order.
    ///
    /// Section `i` covers pages `[headings[i].page, headings[i+1].page)`; the
    /// last section runs through the end of the document. A section whose
    /// pages cannot be read is skipped and reported.
    pub fn segment<S: PageSource + ?Sized>(
        &self,
        source: &S,
        headings: &[Heading],
    ) -> Partial<Vec<Section>> {
        let document = source.id().name;
        let page_count = source.page_count();
        let mut pages: HashMap<u32, std::result::Result<String, String>> = HashMap::new();

        let mut sections = Vec::with_capacity(headings.len());
        let mut failures = Vec::new();

        for (index, heading) in headings.iter().enumerate() {
            let start_page = heading.page;
            let end_page = headings
                .get(index + 1)
                .map(|next| next.page)
                .unwrap_or(page_count + 1);

            let mut texts = Vec::new();
            let mut failed = None;
            for page in start_page..end_page {
                let text = pages
                    .entry(page)
                    .or_insert_with(|| source.page_text(page).map_err(|e| e.to_string()));
                match text {
                    Ok(text) => texts.push(text.clone()),
                    Err(message) => {
                        failed = Some(message.clone());
                        break;
                    }
                }
            }

            if let Some(message) = failed {
                failures.push(UnitFailure::new(
                    Unit::Section {
                        index,
                        title: heading.text.clone(),
                    },
                    message,
                ));
                continue;
            }

            let full_text = normalize_whitespace(&texts.join("\n"));
            let chunks = self.chunker.chunk(&full_text);
            sections.push(Section {
                title: heading.text.clone(),
                level: heading.level,
                start_page,
                end_page,
                full_text,
                chunks,
                document: document.clone(),
            });
        }

        Partial {
            value: sections,
            failures,
        }
    }
}

/// Collapse every whitespace run to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::{HeadingLevel, PositionKey, RawLine};
    use crate::source::{DocumentId, MemorySource};

    fn heading(text: &str, page: u32, y0: f32) -> Heading {
        Heading::new(HeadingLevel::H1, text, PositionKey::new(page, y0))
    }

    fn source(pages: &[&str]) -> MemorySource {
        pages.iter().fold(MemorySource::new("doc.pdf"), |doc, text| {
            doc.with_page_text(vec![], *text)
        })
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\tb   c \n"), "a b c");
        assert_eq!(normalize_whitespace("\n\n"), "");
    }

    #[test]
    fn test_sections_are_contiguous() {
        let doc = source(&["one", "two", "three", "four"]);
        let headings = vec![heading("A", 1, 10.0), heading("B", 2, 10.0), heading("C", 4, 10.0)];
        let sections = SectionSegmenter::default().segment(&doc, &headings).into_value();

        assert_eq!(sections.len(), 3);
        for pair in sections.windows(2) {
            assert_eq!(pair[0].end_page, pair[1].start_page);
        }
        assert_eq!(sections[0].full_text, "one");
        assert_eq!(sections[1].full_text, "two three");
        assert_eq!(sections[2].full_text, "four");
        assert_eq!(sections[2].end_page, 5);
        assert_eq!(sections[1].document, "doc.pdf");
    }

    #[test]
    fn test_same_page_headings_share_boundary() {
        let doc = source(&["alpha  beta\n gamma", "delta"]);
        let headings = vec![heading("A", 1, 10.0), heading("B", 1, 300.0)];
        let sections = SectionSegmenter::default().segment(&doc, &headings).into_value();

        assert_eq!(sections[0].start_page, 1);
        assert_eq!(sections[0].end_page, 1);
        assert_eq!(sections[0].full_text, "");
        assert!(sections[0].chunks.is_empty());
        assert_eq!(sections[1].full_text, "alpha beta gamma delta");
        assert_eq!(sections[1].chunks, vec!["alpha beta gamma delta".to_string()]);
    }

    #[test]
    fn test_no_headings_no_sections() {
        let doc = source(&["text"]);
        let partial = SectionSegmenter::default().segment(&doc, &[]);
        assert!(partial.value.is_empty());
        assert!(partial.is_complete());
    }

    struct MissingPage;

    impl PageSource for MissingPage {
        fn id(&self) -> DocumentId {
            DocumentId::new("gappy.pdf")
        }

        fn page_count(&self) -> u32 {
            3
        }

        fn page_lines(&self, _page: u32) -> Result<Vec<RawLine>> {
            Ok(vec![])
        }

        fn page_text(&self, page: u32) -> Result<String> {
            if page == 2 {
                Err(Error::PageOutOfRange(2, 3))
            } else {
                Ok(format!("page {}", page))
            }
        }
    }

    #[test]
    fn test_failed_section_is_skipped() {
        let headings = vec![heading("A", 1, 0.0), heading("B", 2, 0.0), heading("C", 3, 0.0)];
        let partial = SectionSegmenter::default().segment(&MissingPage, &headings);

        let titles: Vec<&str> = partial.value.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
        assert_eq!(partial.failures.len(), 1);
        assert!(matches!(
            partial.failures[0].unit,
            Unit::Section { index: 1, .. }
        ));
    }
}
