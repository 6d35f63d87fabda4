//! Cross-document section ranking.

use crate::error::{Error, Result};
use crate::model::{RankingResult, ScoredSection, Section};

use super::options::RankOptions;
use super::scorer::RelevanceScorer;
use super::similarity::SimilarityBackend;

/// Ranks sections against a persona and a task.
pub struct SectionRanker<'a> {
    backend: &'a dyn SimilarityBackend,
    scorer: RelevanceScorer,
    top_k: usize,
}

impl<'a> SectionRanker<'a> {
    pub fn new(backend: &'a dyn SimilarityBackend, options: &RankOptions) -> Self {
        Self {
            backend,
            scorer: RelevanceScorer::from_options(options),
            top_k: options.top_k,
        }
    }

    /// Build the query string for a persona and a job.
    pub fn query(persona: &str, job: &str) -> String {
        format!("{}: {}", persona, job)
    }

    /// Score, sort and truncate `sections`.
    ///
    /// Sections must arrive in discovery order (document order, then heading
    /// order); ties keep that order. The backend is called once over all
    /// section texts. If it fails or returns the wrong number of values,
    /// every similarity is taken as zero.
    pub fn rank(&self, sections: Vec<Section>, persona: &str, job: &str) -> Result<RankingResult> {
        if sections.is_empty() {
            return Err(Error::NoSections);
        }

        let query = Self::query(persona, job);
        let texts: Vec<String> = sections.iter().map(|s| s.full_text.clone()).collect();
        let similarities = self.similarities(&texts, &query);

        let mut scored: Vec<ScoredSection> = sections
            .into_iter()
            .zip(similarities)
            .map(|(section, semantic)| {
                let relevance_score = self.scorer.score(&section, semantic, &query);
                ScoredSection {
                    section,
                    relevance_score,
                    rank: 0,
                }
            })
            .collect();

        // sort_by is stable
        scored.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        for (i, s) in scored.iter_mut().enumerate() {
            s.rank = i + 1;
        }

        let total_sections = scored.len();
        scored.truncate(self.top_k);

        log::info!(
            "Ranked {} sections with {} backend, kept {}",
            total_sections,
            self.backend.name(),
            scored.len()
        );

        Ok(RankingResult {
            extracted_sections: scored,
            total_sections,
            failed_documents: Vec::new(),
            metadata: None,
        })
    }

    fn similarities(&self, texts: &[String], query: &str) -> Vec<f64> {
        match self.backend.similarities(texts, query) {
            Ok(mut values) if values.len() == texts.len() => {
                let invalid = values.iter().filter(|v| !v.is_finite()).count();
                if invalid > 0 {
                    log::warn!(
                        "{} backend returned {} non-finite similarities, using zero for them",
                        self.backend.name(),
                        invalid
                    );
                    values
                        .iter_mut()
                        .filter(|v| !v.is_finite())
                        .for_each(|v| *v = 0.0);
                }
                values
            }
            Ok(values) => {
                log::error!(
                    "{} backend returned {} similarities for {} sections, using zeros",
                    self.backend.name(),
                    values.len(),
                    texts.len()
                );
                vec![0.0; texts.len()]
            }
            Err(e) => {
                log::error!("{} backend failed: {}, using zeros", self.backend.name(), e);
                vec![0.0; texts.len()]
            }
        }
    }
}
