//! Relation retrieval and stopword boundaries.
//!
//! Relation phrases come from external knowledge sources (autosuggest
//! scrapers, structured-knowledge lookups, open information extraction);
//! none of that lives here. The engine sees only [`RelationSource`]: a
//! pure, possibly-empty, possibly-slow function from a directed entity
//! pair to phrases. [`StopwordFilter`] zeroes trivial matches the same
//! way the frequency layer of the original system did.

use std::collections::{HashMap, HashSet};

/// Source of relation phrases for a directed entity pair.
///
/// Treated by the engine as pure: identical arguments must yield
/// identical phrases within one mapping run. Results are memoized per
/// directed pair by the scoring layer, which also deduplicates, sorts,
/// and drops stopword phrases, so implementations can return raw lists.
/// An empty result is a normal outcome, not an error, and the engine
/// never retries.
pub trait RelationSource {
    /// Relation phrases asserted between `a` (subject) and `b` (object).
    fn relations(&self, a: &str, b: &str) -> Vec<String>;
}

/// Filter marking phrases too generic to count as evidence.
pub trait StopwordFilter {
    /// Whether the phrase is a stopword.
    fn is_stopword(&self, phrase: &str) -> bool;
}

/// In-memory relation table, for tests and embedding callers that
/// gather relations up front.
///
/// # Example
///
/// ```
/// use anamap::relations::{RelationSource, StaticRelations};
///
/// let relations = StaticRelations::new()
///     .with_relations("earth", "sun", &["revolves around", "orbits"]);
/// assert_eq!(relations.relations("earth", "sun").len(), 2);
/// assert!(relations.relations("sun", "earth").is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRelations {
    edges: HashMap<(String, String), Vec<String>>,
}

impl StaticRelations {
    /// Create an empty relation table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the phrases of a directed entity pair.
    #[must_use]
    pub fn with_relations(mut self, a: &str, b: &str, phrases: &[&str]) -> Self {
        self.edges.insert(
            (a.to_string(), b.to_string()),
            phrases.iter().map(|p| p.to_string()).collect(),
        );
        self
    }
}

impl RelationSource for StaticRelations {
    fn relations(&self, a: &str, b: &str) -> Vec<String> {
        self.edges
            .get(&(a.to_string(), b.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// A filter that never marks anything as a stopword.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStopwords;

impl StopwordFilter for NoStopwords {
    fn is_stopword(&self, _phrase: &str) -> bool {
        false
    }
}

/// A fixed stopword list.
#[derive(Debug, Clone, Default)]
pub struct StopwordList {
    words: HashSet<String>,
}

impl StopwordList {
    /// Build a filter from an explicit phrase list.
    #[must_use]
    pub fn from_phrases(phrases: &[&str]) -> Self {
        Self {
            words: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl StopwordFilter for StopwordList {
    fn is_stopword(&self, phrase: &str) -> bool {
        self.words.contains(phrase)
    }
}

/// Frequency-based stopwords: the most common corpus phrases are too
/// generic to distinguish anything and are filtered out.
///
/// `threshold` selects how many of the most frequent phrases count as
/// stopwords; a value below 1.0 is interpreted as a fraction of the
/// vocabulary. A manual list can be merged in regardless of frequency.
///
/// # Example
///
/// ```
/// use anamap::relations::{FrequencyStopwords, StopwordFilter};
///
/// let counts = [("have", 900_u64), ("orbit", 40), ("revolve around", 12)];
/// let filter = FrequencyStopwords::new(
///     counts.iter().map(|(p, c)| (p.to_string(), *c)),
///     1.0,
/// );
/// assert!(filter.is_stopword("have"));
/// assert!(!filter.is_stopword("orbit"));
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyStopwords {
    stopwords: HashSet<String>,
}

impl FrequencyStopwords {
    /// Build the filter from phrase counts and a threshold.
    #[must_use]
    pub fn new(counts: impl IntoIterator<Item = (String, u64)>, threshold: f64) -> Self {
        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        // highest frequency first; lexicographic tie-break keeps the cut deterministic
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let take = if threshold >= 1.0 {
            threshold as usize
        } else {
            (threshold * ranked.len() as f64) as usize
        };

        Self {
            stopwords: ranked.into_iter().take(take).map(|(p, _)| p).collect(),
        }
    }

    /// Merge a manual stopword list in, regardless of frequency rank.
    #[must_use]
    pub fn with_manual(mut self, phrases: &[&str]) -> Self {
        for phrase in phrases {
            self.stopwords.insert(phrase.to_string());
        }
        self
    }
}

impl StopwordFilter for FrequencyStopwords {
    fn is_stopword(&self, phrase: &str) -> bool {
        self.stopwords.contains(phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_relations_missing_pair_is_empty() {
        let relations = StaticRelations::new();
        assert!(relations.relations("a", "b").is_empty());
    }

    #[test]
    fn test_static_relations_directed() {
        let relations = StaticRelations::new().with_relations("a", "b", &["r1"]);
        assert_eq!(relations.relations("a", "b"), vec!["r1".to_string()]);
        assert!(relations.relations("b", "a").is_empty());
    }

    #[test]
    fn test_stopword_list() {
        let filter = StopwordList::from_phrases(&["have", "need"]);
        assert!(filter.is_stopword("have"));
        assert!(!filter.is_stopword("orbit"));
    }

    #[test]
    fn test_frequency_stopwords_integer_threshold() {
        let counts = vec![
            ("have".to_string(), 900_u64),
            ("need".to_string(), 500),
            ("orbit".to_string(), 40),
        ];
        let filter = FrequencyStopwords::new(counts, 2.0);
        assert!(filter.is_stopword("have"));
        assert!(filter.is_stopword("need"));
        assert!(!filter.is_stopword("orbit"));
    }

    #[test]
    fn test_frequency_stopwords_fractional_threshold() {
        let counts: Vec<(String, u64)> = (0..10)
            .map(|i| (format!("phrase{i}"), 100 - i as u64))
            .collect();
        let filter = FrequencyStopwords::new(counts, 0.2);
        // 20% of a 10-entry vocabulary: the two most frequent phrases
        assert!(filter.is_stopword("phrase0"));
        assert!(filter.is_stopword("phrase1"));
        assert!(!filter.is_stopword("phrase2"));
    }

    #[test]
    fn test_frequency_stopwords_manual_merge() {
        let filter = FrequencyStopwords::new(std::iter::empty(), 0.0).with_manual(&["the"]);
        assert!(filter.is_stopword("the"));
        assert!(!filter.is_stopword("orbit"));
    }
}
