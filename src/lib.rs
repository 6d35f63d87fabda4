//! # pdfinsight
//!
//! Document outline extraction and persona-driven section ranking for PDFs.
//!
//! The library infers a title and an H1/H2/H3 outline from font statistics,
//! splits documents into sections between headings, and ranks those sections
//! across many documents against a persona and a task.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfinsight::{extract_outline, render, LopdfSource, OutlineOptions};
//!
//! fn main() -> pdfinsight::Result<()> {
//!     let source = LopdfSource::open("report.pdf")?;
//!     let outline = extract_outline(&source, &OutlineOptions::default())?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Ranking
//!
//! ```no_run
//! use pdfinsight::{rank_sections, LopdfSource, RankOptions, TfIdfSimilarity};
//!
//! # fn main() -> pdfinsight::Result<()> {
//! let sources = vec![LopdfSource::open("a.pdf")?, LopdfSource::open("b.pdf")?];
//! let backend = TfIdfSimilarity::default();
//! let ranking = rank_sections(
//!     &sources,
//!     "Investment Analyst",
//!     "Analyze revenue trends",
//!     &backend,
//!     &RankOptions::default(),
//! )?;
//! for s in &ranking.extracted_sections {
//!     println!("{} {}", s.rank, s.section.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod error;
pub mod model;
pub mod rank;
pub mod render;
pub mod source;
pub mod structure;

pub use batch::{BatchExtractor, BatchOptions, DocumentOutcome};
pub use error::{Error, Partial, Result, Unit, UnitFailure};
pub use model::{
    BoundingBox, Heading, HeadingLevel, OutlineMetadata, OutlineResult, PositionKey,
    RankingMetadata, RankingResult, RawLine, RawRun, ScoredSection, Section, TextBlock,
};
pub use rank::{
    select_backend, Embedder, EmbeddingSimilarity, RankOptions, RelevanceScorer, ScoreWeights,
    SectionRanker, SimilarityBackend, TfIdfSimilarity,
};
pub use render::JsonFormat;
#[cfg(feature = "pdf")]
pub use source::LopdfSource;
pub use source::{DocumentId, MemorySource, PageSource};
pub use structure::{
    BlockNormalizer, ChunkOptions, FontPolicy, OutlineExtractor, OutlineOptions,
    SectionSegmenter, TextChunker,
};

use std::time::Instant;

use rayon::prelude::*;

/// Extract the title and heading outline of one document.
///
/// Pages whose line records cannot be read are skipped with a warning.
///
/// # Errors
///
/// * [`Error::Validation`] if the document has no pages or too many
/// * [`Error::NoText`] if no page carries sized text
pub fn extract_outline<S: PageSource + ?Sized>(
    source: &S,
    options: &OutlineOptions,
) -> Result<OutlineResult> {
    let started = Instant::now();
    let id = source.id();
    let pages = source::validate(source, options.max_pages)?;

    let blocks = BlockNormalizer::new(options.font_policy).normalize_document(source);
    blocks.log_failures(&id.name);

    let mut outline = OutlineExtractor::new(options.clone()).extract(&blocks.value)?;

    let elapsed = started.elapsed();
    if elapsed > options.time_budget {
        log::warn!(
            "Outline extraction for {} took {:.2}s (budget {:.0}s)",
            id,
            elapsed.as_secs_f64(),
            options.time_budget.as_secs_f64()
        );
    }
    log::info!(
        "Extracted {} headings from {} ({} pages) in {:.2}s",
        outline.heading_count(),
        id,
        pages,
        elapsed.as_secs_f64()
    );

    outline.metadata = Some(OutlineMetadata {
        filename: id.name,
        fingerprint: id.fingerprint,
        processing_time: elapsed.as_secs_f64(),
    });
    Ok(outline)
}

/// Extract the outline of one document and split it into sections.
pub fn extract_sections<S: PageSource + ?Sized>(
    source: &S,
    outline_options: &OutlineOptions,
    chunk: ChunkOptions,
) -> Result<Vec<Section>> {
    let outline = extract_outline(source, outline_options)?;
    segment_outline(source, &outline, chunk)
}

/// Split a document into sections along an already extracted outline.
///
/// Sections whose pages cannot be read are skipped with a warning.
pub fn segment_outline<S: PageSource + ?Sized>(
    source: &S,
    outline: &OutlineResult,
    chunk: ChunkOptions,
) -> Result<Vec<Section>> {
    let segmenter = SectionSegmenter::new(TextChunker::new(chunk)?);
    let sections = segmenter.segment(source, &outline.outline);
    sections.log_failures(&source.id().name);
    Ok(sections.into_value())
}

/// Rank the sections of several documents against a persona and a task.
///
/// Documents are processed independently; one that fails is logged, listed
/// in [`RankingResult::failed_documents`] and contributes no sections.
/// Section order before ranking is document order, then heading order.
///
/// # Errors
///
/// * [`Error::NoSections`] if no document produced a section
/// * [`Error::InvalidOption`] if the chunk options are invalid
pub fn rank_sections<S: PageSource>(
    sources: &[S],
    persona: &str,
    job: &str,
    backend: &dyn SimilarityBackend,
    options: &RankOptions,
) -> Result<RankingResult> {
    let started = Instant::now();
    options.chunk.validate()?;

    let per_document: Vec<(DocumentId, Result<Vec<Section>>)> = sources
        .par_iter()
        .map(|source| {
            (
                source.id(),
                extract_sections(source, &options.outline, options.chunk),
            )
        })
        .collect();

    rank_from(per_document, persona, job, backend, options, started)
}

/// Rank sections that were already segmented, one entry per document.
///
/// Entries holding an error are listed in
/// [`RankingResult::failed_documents`]; every entry is listed in the
/// metadata documents.
///
/// # Errors
///
/// * [`Error::NoSections`] if no document produced a section
pub fn rank_documents(
    documents: Vec<(DocumentId, Result<Vec<Section>>)>,
    persona: &str,
    job: &str,
    backend: &dyn SimilarityBackend,
    options: &RankOptions,
) -> Result<RankingResult> {
    rank_from(documents, persona, job, backend, options, Instant::now())
}

fn rank_from(
    per_document: Vec<(DocumentId, Result<Vec<Section>>)>,
    persona: &str,
    job: &str,
    backend: &dyn SimilarityBackend,
    options: &RankOptions,
    started: Instant,
) -> Result<RankingResult> {
    let mut sections = Vec::new();
    let mut failed_documents = Vec::new();
    let mut documents = Vec::with_capacity(per_document.len());
    for (id, result) in per_document {
        match result {
            Ok(found) => {
                log::debug!("{} contributed {} sections", id, found.len());
                sections.extend(found);
            }
            Err(e) => {
                log::error!("Skipping {} in ranking: {}", id, e);
                failed_documents.push(id.name.clone());
            }
        }
        documents.push(id.name);
    }

    let mut result = SectionRanker::new(backend, options).rank(sections, persona, job)?;

    let elapsed = started.elapsed();
    if elapsed > options.time_budget {
        log::warn!(
            "Ranking {} documents took {:.2}s (budget {:.0}s)",
            documents.len(),
            elapsed.as_secs_f64(),
            options.time_budget.as_secs_f64()
        );
    }

    result.failed_documents = failed_documents;
    result.metadata = Some(RankingMetadata {
        documents,
        persona: persona.to_string(),
        job: job.to_string(),
        processing_time: elapsed.as_secs_f64(),
    });
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, size: f32, y: f32) -> RawLine {
        RawLine::new(vec![RawRun::new(
            text,
            size,
            "Helvetica",
            BoundingBox::new(72.0, y, 400.0, y + size),
        )])
    }

    fn report() -> MemorySource {
        MemorySource::new("report.pdf")
            .with_page_text(
                vec![
                    line("Quarterly Report", 24.0, 40.0),
                    line("Revenue", 16.0, 90.0),
                    line("revenue rose to $4 million", 10.0, 120.0),
                    line("driven by new customers", 10.0, 140.0),
                ],
                "Quarterly Report\nRevenue\nrevenue rose to $4 million\ndriven by new customers",
            )
            .with_page_text(
                vec![
                    line("Outlook", 16.0, 40.0),
                    line("we expect steady growth", 10.0, 70.0),
                    line("across all regions", 10.0, 90.0),
                ],
                "Outlook\nwe expect steady growth\nacross all regions",
            )
    }

    #[test]
    fn test_extract_outline_with_metadata() {
        let outline = extract_outline(&report(), &OutlineOptions::default()).unwrap();

        assert_eq!(outline.title, "Quarterly Report");
        let texts: Vec<&str> = outline.outline.iter().map(|h| h.text.as_str()).collect();
        assert!(texts.contains(&"Revenue"));
        assert!(texts.contains(&"Outlook"));

        let metadata = outline.metadata.unwrap();
        assert_eq!(metadata.filename, "report.pdf");
        assert!(metadata.processing_time >= 0.0);
    }

    #[test]
    fn test_extract_outline_rejects_empty_document() {
        let result = extract_outline(&MemorySource::new("blank.pdf"), &OutlineOptions::default());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_extract_outline_rejects_long_document() {
        let mut doc = MemorySource::new("long.pdf");
        for _ in 0..3 {
            doc = doc.with_page(vec![line("text", 10.0, 10.0)]);
        }
        let options = OutlineOptions::default().with_max_pages(2);
        assert!(matches!(
            extract_outline(&doc, &options),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_rank_sections_reports_failed_documents() {
        let sources = vec![report(), MemorySource::new("broken.pdf")];
        let result = rank_sections(
            &sources,
            "Investment Analyst",
            "analyze revenue",
            &TfIdfSimilarity::default(),
            &RankOptions::default(),
        )
        .unwrap();

        assert!(result.total_sections > 0);
        assert_eq!(result.failed_documents, vec!["broken.pdf".to_string()]);
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.documents, vec!["report.pdf", "broken.pdf"]);
        assert_eq!(metadata.persona, "Investment Analyst");
    }

    #[test]
    fn test_rank_sections_without_sections() {
        let sources = vec![MemorySource::new("broken.pdf")];
        let result = rank_sections(
            &sources,
            "p",
            "j",
            &TfIdfSimilarity::default(),
            &RankOptions::default(),
        );
        assert!(matches!(result, Err(Error::NoSections)));
    }

    #[test]
    fn test_rank_documents_reuses_outline() {
        let doc = report();
        let outline = extract_outline(&doc, &OutlineOptions::default()).unwrap();
        let sections = segment_outline(&doc, &outline, ChunkOptions::default()).unwrap();
        assert_eq!(sections.len(), outline.heading_count());

        let documents = vec![
            (doc.id(), Ok(sections)),
            (
                DocumentId::new("locked.pdf"),
                Err(Error::Validation("cannot open".to_string())),
            ),
        ];
        let result = rank_documents(
            documents,
            "Investment Analyst",
            "analyze revenue",
            &TfIdfSimilarity::default(),
            &RankOptions::default(),
        )
        .unwrap();

        assert_eq!(result.failed_documents, vec!["locked.pdf".to_string()]);
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.documents, vec!["report.pdf", "locked.pdf"]);
        assert_eq!(result.total_sections, outline.heading_count());
    }
}
