//! Parallel outline extraction over many documents.
//!
//! Each document is processed by one task on a bounded worker pool. Tasks
//! share nothing but the output channel, which receives exactly one
//! [`DocumentOutcome`] per document in completion order.

use crossbeam_channel::{unbounded, Sender};
use rayon::ThreadPoolBuilder;

use crate::error::{Error, Result};
use crate::model::OutlineResult;
use crate::source::{DocumentId, PageSource};
use crate::structure::OutlineOptions;

/// Options for batch extraction.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Worker pool width
    pub max_workers: usize,

    /// Options applied to every document
    pub outline: OutlineOptions,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker pool width (at least one).
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn with_outline(mut self, outline: OutlineOptions) -> Self {
        self.outline = outline;
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: 8,
            outline: OutlineOptions::default(),
        }
    }
}

/// Result of extracting one document in a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    /// Position of the document in the input
    pub index: usize,
    pub document: DocumentId,
    pub result: Result<OutlineResult>,
}

/// Runs outline extraction on a worker pool.
#[derive(Debug, Clone, Default)]
pub struct BatchExtractor {
    options: BatchOptions,
}

impl BatchExtractor {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Extract every source, sending one outcome per document to `sink`.
    ///
    /// Returns once all documents are done. A failing document only affects
    /// its own outcome.
    pub fn run<S: PageSource>(&self, sources: &[S], sink: &Sender<DocumentOutcome>) -> Result<()> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.max_workers.max(1))
            .build()
            .map_err(|e| Error::Other(format!("Failed to build worker pool: {}", e)))?;

        log::info!(
            "Extracting outlines from {} documents with {} workers",
            sources.len(),
            self.options.max_workers
        );

        let options = &self.options.outline;
        pool.scope(|scope| {
            for (index, source) in sources.iter().enumerate() {
                let sink = sink.clone();
                scope.spawn(move |_| {
                    let document = source.id();
                    let result = crate::extract_outline(source, options);
                    if let Err(e) = &result {
                        log::error!("Failed to extract outline from {}: {}", document, e);
                    }
                    let outcome = DocumentOutcome {
                        index,
                        document,
                        result,
                    };
                    if sink.send(outcome).is_err() {
                        log::debug!("Outcome receiver dropped");
                    }
                });
            }
        });

        Ok(())
    }

    /// Extract every source and return the outcomes in input order.
    pub fn run_collect<S: PageSource>(&self, sources: &[S]) -> Result<Vec<DocumentOutcome>> {
        let (tx, rx) = unbounded();
        self.run(sources, &tx)?;
        drop(tx);

        let mut outcomes: Vec<DocumentOutcome> = rx.into_iter().collect();
        outcomes.sort_by_key(|o| o.index);
        Ok(outcomes)
    }
}
