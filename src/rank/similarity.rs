//! Pluggable text similarity backends.
//!
//! A backend maps a batch of texts and one query to one similarity value per
//! text. Two implementations are provided: an embedding-based backend over any
//! [`Embedder`], and a lexical TF-IDF backend that needs no model.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Scores a batch of texts against a query.
pub trait SimilarityBackend: Send + Sync {
    /// Short backend name for logging.
    fn name(&self) -> &str;

    /// One similarity per text, in input order.
    fn similarities(&self, texts: &[String], query: &str) -> Result<Vec<f64>>;
}

impl<B: SimilarityBackend + ?Sized> SimilarityBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn similarities(&self, texts: &[String], query: &str) -> Result<Vec<f64>> {
        (**self).similarities(texts, query)
    }
}

/// Produces a fixed-dimension vector per input string.
pub trait Embedder: Send + Sync {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Cosine similarity of embedded texts against the embedded query.
pub struct EmbeddingSimilarity<E> {
    embedder: E,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: Embedder> SimilarityBackend for EmbeddingSimilarity<E> {
    fn name(&self) -> &str {
        "embedding"
    }

    fn similarities(&self, texts: &[String], query: &str) -> Result<Vec<f64>> {
        let mut batch = texts.to_vec();
        batch.push(query.to_string());

        let vectors = self.embedder.embed(&batch)?;
        if vectors.len() != batch.len() {
            return Err(Error::Similarity(format!(
                "embedder returned {} vectors for {} inputs",
                vectors.len(),
                batch.len()
            )));
        }

        let (query_vec, text_vecs) = vectors
            .split_last()
            .ok_or_else(|| Error::Similarity("empty embedding batch".to_string()))?;
        Ok(text_vecs.iter().map(|v| cosine(v, query_vec)).collect())
    }
}

/// Cosine of two vectors; 0.0 when either has zero norm, the lengths differ
/// or a component is not finite.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    let value = dot / (na.sqrt() * nb.sqrt());
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Use the embedding backend if it could be constructed, TF-IDF otherwise.
pub fn select_backend<E: Embedder + 'static>(embedder: Result<E>) -> Box<dyn SimilarityBackend> {
    match embedder {
        Ok(e) => Box::new(EmbeddingSimilarity::new(e)),
        Err(err) => {
            log::info!("Embedding model unavailable ({}), using TF-IDF similarity", err);
            Box::new(TfIdfSimilarity::default())
        }
    }
}

/// Lexical similarity over a TF-IDF space fitted to the texts and the query.
///
/// Tokens are runs of two or more word characters from lower-cased NFKC
/// text, with English stop words removed. The vocabulary keeps the
/// `max_features` most frequent terms across the batch. Weights use raw
/// term counts and smoothed idf `ln((1 + n) / (1 + df)) + 1`, rows are
/// L2-normalized and similarity is their dot product.
#[derive(Debug, Clone)]
pub struct TfIdfSimilarity {
    max_features: usize,
}

impl TfIdfSimilarity {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    fn vocabulary(&self, docs: &[HashMap<String, usize>]) -> BTreeMap<String, usize> {
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for doc in docs {
            for (term, count) in doc {
                *totals.entry(term.as_str()).or_default() += count;
            }
        }

        let mut terms: Vec<(&str, usize)> = totals.into_iter().collect();
        terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        if self.max_features > 0 {
            terms.truncate(self.max_features);
        }

        let mut kept: Vec<&str> = terms.into_iter().map(|(t, _)| t).collect();
        kept.sort_unstable();
        kept.into_iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect()
    }
}

impl Default for TfIdfSimilarity {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl SimilarityBackend for TfIdfSimilarity {
    fn name(&self) -> &str {
        "tfidf"
    }

    fn similarities(&self, texts: &[String], query: &str) -> Result<Vec<f64>> {
        let docs: Vec<HashMap<String, usize>> = texts
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(query))
            .map(term_counts)
            .collect();

        let vocab = self.vocabulary(&docs);
        if vocab.is_empty() {
            return Err(Error::Similarity(
                "empty vocabulary; texts contain only stop words".to_string(),
            ));
        }

        let n = docs.len() as f64;
        let mut df = vec![0usize; vocab.len()];
        for doc in &docs {
            for term in doc.keys() {
                if let Some(&i) = vocab.get(term) {
                    df[i] += 1;
                }
            }
        }
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows: Vec<Vec<f64>> = docs
            .iter()
            .map(|doc| {
                let mut row = vec![0.0; vocab.len()];
                for (term, count) in doc {
                    if let Some(&i) = vocab.get(term) {
                        row[i] = *count as f64 * idf[i];
                    }
                }
                let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    row.iter_mut().for_each(|w| *w /= norm);
                }
                row
            })
            .collect();

        let (query_row, text_rows) = rows
            .split_last()
            .ok_or_else(|| Error::Similarity("empty batch".to_string()))?;
        Ok(text_rows
            .iter()
            .map(|row| row.iter().zip(query_row).map(|(a, b)| a * b).sum())
            .collect())
    }
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token regex"))
}

/// Tokenize and count terms, dropping stop words.
pub fn term_counts(text: &str) -> HashMap<String, usize> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();
    let stop = stop_words();
    let mut counts = HashMap::new();
    for m in token_regex().find_iter(&normalized) {
        let token = m.as_str();
        if !stop.contains(token) {
            *counts.entry(token.to_string()).or_default() += 1;
        }
    }
    counts
}

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP.get_or_init(|| ENGLISH_STOP_WORDS.iter().copied().collect())
}

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone",
    "anything", "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became",
    "because", "become", "becomes", "becoming", "been", "before", "beforehand", "behind",
    "being", "below", "beside", "besides", "between", "beyond", "bill", "both", "bottom",
    "but", "by", "call", "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry",
    "de", "describe", "detail", "do", "done", "down", "due", "during", "each", "eg",
    "eight", "either", "eleven", "else", "elsewhere", "empty", "enough", "etc", "even",
    "ever", "every", "everyone", "everything", "everywhere", "except", "few", "fifteen",
    "fifty", "fill", "find", "fire", "first", "five", "for", "former", "formerly", "forty",
    "found", "four", "from", "front", "full", "further", "get", "give", "go", "had", "has",
    "hasnt", "have", "he", "hence", "her", "here", "hereafter", "hereby", "herein",
    "hereupon", "hers", "herself", "him", "himself", "his", "how", "however", "hundred",
    "i", "ie", "if", "in", "inc", "indeed", "interest", "into", "is", "it", "its", "itself",
    "keep", "last", "latter", "latterly", "least", "less", "ltd", "made", "many", "may",
    "me", "meanwhile", "might", "mill", "mine", "more", "moreover", "most", "mostly",
    "move", "much", "must", "my", "myself", "name", "namely", "neither", "never",
    "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
    "seemed", "seeming", "seems", "serious", "several", "she", "should", "show", "side",
    "since", "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something",
    "sometime", "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than",
    "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
    "thereby", "therefore", "therein", "thereupon", "these", "they", "thick", "thin",
    "third", "this", "those", "though", "three", "through", "throughout", "thru", "thus",
    "to", "together", "too", "top", "toward", "towards", "twelve", "twenty", "two", "un",
    "under", "until", "up", "upon", "us", "very", "via", "was", "we", "well", "were",
    "what", "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas",
    "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while", "whither",
    "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_term_counts_drop_stop_words_and_short_tokens() {
        let counts = term_counts("The revenue of a Company, and the REVENUE x");
        assert_eq!(counts.get("revenue"), Some(&2));
        assert_eq!(counts.get("company"), Some(&1));
        assert!(!counts.contains_key("the"));
        assert!(!counts.contains_key("x"));
    }

    #[test]
    fn test_tfidf_prefers_overlapping_text() {
        let backend = TfIdfSimilarity::default();
        let scores = backend
            .similarities(
                &texts(&["quarterly revenue grew strongly", "hiking trails near lakes"]),
                "revenue growth analysis",
            )
            .unwrap();

        assert_eq!(scores.len(), 2);
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert!(scores[0] <= 1.0 + 1e-9);
    }

    #[test]
    fn test_tfidf_identical_text_scores_one() {
        let scores = TfIdfSimilarity::default()
            .similarities(&texts(&["machine learning methods"]), "machine learning methods")
            .unwrap();
        assert!((scores[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_tfidf_stop_words_only_is_error() {
        let result = TfIdfSimilarity::default().similarities(&texts(&["the and of"]), "a an");
        assert!(matches!(result, Err(Error::Similarity(_))));
    }

    #[test]
    fn test_vocabulary_limit_keeps_most_frequent() {
        let backend = TfIdfSimilarity::new(1);
        let scores = backend
            .similarities(&texts(&["apple apple banana", "banana cherry"]), "apple")
            .unwrap();
        // Only "apple" (3 occurrences) survives
        assert!((scores[0] - 1.0).abs() < 1e-9);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_cosine_edge_cases() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_non_finite_is_zero() {
        assert_eq!(cosine(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[f32::INFINITY, 1.0], &[1.0, 1.0]), 0.0);
    }

    struct AxisEmbedder;

    impl Embedder for AxisEmbedder {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| if t.contains("money") { vec![1.0, 0.0] } else { vec![0.0, 1.0] })
                .collect())
        }
    }

    struct BrokenEmbedder;

    impl Embedder for BrokenEmbedder {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(vec![vec![1.0]])
        }
    }

    #[test]
    fn test_embedding_similarity() {
        let backend = EmbeddingSimilarity::new(AxisEmbedder);
        let scores = backend
            .similarities(&texts(&["money talk", "weather"]), "money")
            .unwrap();
        assert_eq!(scores, vec![1.0, 0.0]);
    }

    #[test]
    fn test_embedding_length_mismatch() {
        let backend = EmbeddingSimilarity::new(BrokenEmbedder);
        assert!(backend.similarities(&texts(&["a", "b"]), "q").is_err());
    }

    #[test]
    fn test_select_backend_falls_back() {
        let backend = select_backend::<AxisEmbedder>(Err(Error::Other("no model".to_string())));
        assert_eq!(backend.name(), "tfidf");

        let backend = select_backend(Ok(AxisEmbedder));
        assert_eq!(backend.name(), "embedding");
    }
}
