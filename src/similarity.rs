//! Semantic similarity boundary and fallback oracles.
//!
//! The embedding model that scores phrase similarity lives outside this
//! crate; the engine only sees the [`SimilarityOracle`] trait. Two
//! in-crate implementations cover tests and embedding callers without a
//! model: [`LexicalOracle`] (string strategies) and [`EmbeddingOracle`]
//! (cosine over caller-supplied vectors). [`TableOracle`] pins exact
//! values for scenario tests.

use std::collections::HashMap;

/// Oracle scoring the semantic similarity of two phrases.
///
/// The contract mirrors an embedding model: deterministic for fixed
/// weights, returning a value in `[0.0, 1.0]`. Implementations may be
/// slow; the scoring layer memoizes every call for the lifetime of one
/// mapping run, so an oracle does not need its own cache.
pub trait SimilarityOracle {
    /// Similarity of two phrases in `[0.0, 1.0]`.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// String-strategy similarity, usable when no embedding model is wired in.
///
/// Returns 1.0 for an exact match (after lowercasing), 0.8 when one
/// phrase contains the other, and the word-level Jaccard coefficient
/// otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOracle;

impl LexicalOracle {
    /// Create a new lexical oracle.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SimilarityOracle for LexicalOracle {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        string_similarity(a, b)
    }
}

/// Compute string similarity using multiple strategies.
///
/// Returns a value in [0.0, 1.0] where:
/// - 1.0 = identical strings
/// - 0.8 = substring match (one contains the other)
/// - 0.0-0.8 = Jaccard similarity on word sets
///
/// # Examples
///
/// ```
/// use anamap::similarity::string_similarity;
///
/// assert!((string_similarity("revolves around", "revolves around") - 1.0).abs() < 0.001);
/// assert!(string_similarity("revolves around", "revolves") > 0.5);
/// assert!(string_similarity("revolves around", "binds to") < 0.5);
/// ```
#[must_use]
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();

    // Exact match
    if a_lower == b_lower {
        return 1.0;
    }

    // Substring match
    if a_lower.contains(&b_lower) || b_lower.contains(&a_lower) {
        return 0.8;
    }

    // Jaccard similarity on words
    jaccard_word_similarity(&a_lower, &b_lower)
}

/// Compute Jaccard similarity on word sets.
///
/// Splits phrases by whitespace and computes the Jaccard coefficient of
/// the resulting word sets.
#[must_use]
pub fn jaccard_word_similarity(a: &str, b: &str) -> f64 {
    let words_a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let words_b: std::collections::HashSet<&str> = b.split_whitespace().collect();

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Compute embedding similarity using cosine similarity.
///
/// Returns a value in [0.0, 1.0] where 1.0 is identical; the raw cosine
/// range [-1, 1] is normalized up front so downstream thresholds always
/// see unit-interval weights.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b) + 1.0) / 2.0
}

/// Similarity over caller-supplied phrase embeddings.
///
/// Phrases without a vector fall back to 0.0 (1.0 against themselves),
/// which keeps unknown phrases from matching anything.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingOracle {
    vectors: HashMap<String, Vec<f64>>,
}

impl EmbeddingOracle {
    /// Create an empty embedding oracle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the embedding vector of a phrase.
    #[must_use]
    pub fn with_vector(mut self, phrase: impl Into<String>, vector: Vec<f64>) -> Self {
        self.vectors.insert(phrase.into(), vector);
        self
    }
}

impl SimilarityOracle for EmbeddingOracle {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        match (self.vectors.get(a), self.vectors.get(b)) {
            (Some(va), Some(vb)) => cosine_similarity(va, vb),
            _ => 0.0,
        }
    }
}

/// A similarity oracle backed by an explicit value table.
///
/// Intended for tests that need engineered similarity landscapes. Pairs
/// are stored symmetrically; identical phrases score 1.0 and unlisted
/// pairs score the configured default (0.0 unless overridden).
///
/// # Example
///
/// ```
/// use anamap::similarity::{SimilarityOracle, TableOracle};
///
/// let oracle = TableOracle::new().with_pair("orbits", "circles", 0.9);
/// assert!((oracle.similarity("circles", "orbits") - 0.9).abs() < f64::EPSILON);
/// assert!((oracle.similarity("orbits", "orbits") - 1.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableOracle {
    pairs: HashMap<(String, String), f64>,
    default: f64,
}

impl TableOracle {
    /// Create an empty table oracle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity of a phrase pair (stored symmetrically).
    #[must_use]
    pub fn with_pair(mut self, a: impl Into<String>, b: impl Into<String>, similarity: f64) -> Self {
        let (a, b) = (a.into(), b.into());
        self.pairs.insert((b.clone(), a.clone()), similarity);
        self.pairs.insert((a, b), similarity);
        self
    }

    /// Set the similarity reported for unlisted pairs.
    #[must_use]
    pub fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }
}

impl SimilarityOracle for TableOracle {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        self.pairs
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .unwrap_or(self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_similarity_identical() {
        assert!((string_similarity("orbits", "orbits") - 1.0).abs() < 0.001);
        assert!((string_similarity("Orbits", "orbits") - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_string_similarity_substring() {
        let sim = string_similarity("revolves around", "revolves");
        assert!((sim - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_string_similarity_jaccard() {
        // "revolves around" and "spins around" share "around", union has 3 words
        let sim = string_similarity("revolves around", "spins around");
        assert!(sim > 0.3 && sim < 0.8);
    }

    #[test]
    fn test_cosine_similarity_extremes() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) - 0.0).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_embedding_oracle_unknown_phrase() {
        let oracle = EmbeddingOracle::new().with_vector("orbits", vec![1.0, 0.0]);
        assert_eq!(oracle.similarity("orbits", "unknown"), 0.0);
        assert_eq!(oracle.similarity("unknown", "unknown"), 1.0);
    }

    #[test]
    fn test_table_oracle_symmetric() {
        let oracle = TableOracle::new().with_pair("a", "b", 0.4);
        assert_eq!(oracle.similarity("a", "b"), 0.4);
        assert_eq!(oracle.similarity("b", "a"), 0.4);
        assert_eq!(oracle.similarity("a", "c"), 0.0);
    }
}
