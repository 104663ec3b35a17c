//! Search state: partial mapping solutions, candidate filtering, and
//! the registry that collapses states reached via different commit
//! orders.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::pair::PairMapping;
use crate::score::{round3, CandidateSet, ScoreCache};

/// A scored, possibly partial, mapping between the two domains.
///
/// The committed base and target lists always have equal length and
/// together form a partial injective correspondence. It is extended
/// monotonically - a commit never revises an earlier correspondence -
/// and states branch by clone-then-commit, so one lineage never aliases
/// another's bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct Solution {
    /// Correspondences rendered as `"base --> target"`, in commit order.
    pub mapping: Vec<String>,
    /// Commit history: the pair hypotheses accepted so far.
    pub relations: Vec<PairMapping>,
    /// Per-commit pair scores, aligned with `relations`.
    pub scores: Vec<f64>,
    /// Per-commit coverage, aligned with `relations`.
    pub coverage: Vec<usize>,
    /// Cumulative score.
    pub score: f64,
    /// Committed base entities, in commit order.
    pub base: Vec<String>,
    /// Committed target entities, aligned with `base`.
    pub target: Vec<String>,
    /// Number of committed correspondences.
    pub length: usize,
    /// Entities added by the suggestion completer, if any.
    pub suggestions: Vec<String>,
    #[serde(skip)]
    base_index: HashMap<String, usize>,
    #[serde(skip)]
    target_index: HashMap<String, usize>,
    /// Remaining valid candidate ids, in rank order. Only ever shrinks.
    #[serde(skip)]
    pub(crate) available: Vec<u32>,
}

impl Solution {
    /// The empty state every search starts from.
    #[must_use]
    pub(crate) fn empty(available: Vec<u32>) -> Self {
        Self {
            mapping: Vec::new(),
            relations: Vec::new(),
            scores: Vec::new(),
            coverage: Vec::new(),
            score: 0.0,
            base: Vec::new(),
            target: Vec::new(),
            length: 0,
            suggestions: Vec::new(),
            base_index: HashMap::new(),
            target_index: HashMap::new(),
            available,
        }
    }

    /// Whether a candidate hypothesis is consistent with the committed
    /// correspondence: no committed entity may map elsewhere, and a
    /// candidate whose entities are all already committed on either
    /// side adds nothing.
    #[must_use]
    pub(crate) fn admits(&self, candidate: &PairMapping) -> bool {
        let (b1, b2) = (&candidate.base.0, &candidate.base.1);
        let (t1, t2) = (&candidate.target.0, &candidate.target.1);

        let b1_at = self.base_index.get(b1);
        let b2_at = self.base_index.get(b2);
        if b1_at.is_some() && b2_at.is_some() {
            return false;
        }
        if let Some(&i) = b1_at {
            if self.target[i] != *t1 {
                return false;
            }
        }
        if let Some(&i) = b2_at {
            if self.target[i] != *t2 {
                return false;
            }
        }

        let t1_at = self.target_index.get(t1);
        let t2_at = self.target_index.get(t2);
        if t1_at.is_some() && t2_at.is_some() {
            return false;
        }
        if let Some(&i) = t1_at {
            if self.base[i] != *b1 {
                return false;
            }
        }
        if let Some(&i) = t2_at {
            if self.base[i] != *b2 {
                return false;
            }
        }

        true
    }

    /// Commit an accepted hypothesis: record it in the history and add
    /// its new correspondences, each contributing its incremental score
    /// against everything committed before it.
    ///
    /// # Panics
    ///
    /// Panics when the hypothesis conflicts with the committed
    /// correspondence - callers must filter with [`Self::admits`]
    /// first, so a conflict here is a programming error.
    pub(crate) fn commit(
        &mut self,
        mapping: &PairMapping,
        pair_score: f64,
        pair_coverage: usize,
        cache: &ScoreCache,
    ) {
        self.relations.push(mapping.clone());
        self.scores.push(round3(pair_score));
        self.coverage.push(pair_coverage);

        let mut gained = 0.0;
        gained += self.extend(&mapping.base.0, &mapping.target.0, cache);
        gained += self.extend(&mapping.base.1, &mapping.target.1, cache);
        self.score += round3(gained);

        self.length = self.base.len();
        self.mapping = self.correspondence_strings();
    }

    fn extend(&mut self, b: &str, t: &str, cache: &ScoreCache) -> f64 {
        let b_committed = self.base_index.contains_key(b);
        let t_committed = self.target_index.contains_key(t);
        if b_committed != t_committed {
            panic!("conflicting commit: {b} --> {t} crosses an existing correspondence");
        }
        if b_committed {
            return 0.0;
        }
        let gained = cache.incremental_score(&self.base, &self.target, b, t);
        self.base_index.insert(b.to_string(), self.base.len());
        self.target_index.insert(t.to_string(), self.target.len());
        self.base.push(b.to_string());
        self.target.push(t.to_string());
        gained
    }

    /// Drop remaining candidates made inconsistent by the last commit.
    /// The result is always a subset of the previous list.
    pub(crate) fn retain_available(&mut self, candidates: &CandidateSet) {
        let available = std::mem::take(&mut self.available);
        self.available = available
            .into_iter()
            .filter(|&id| self.admits(candidates.mapping(id)))
            .collect();
    }

    /// The committed correspondences rendered as `"base --> target"`.
    #[must_use]
    pub fn correspondence_strings(&self) -> Vec<String> {
        self.base
            .iter()
            .zip(self.target.iter())
            .map(|(b, t)| format!("{b} --> {t}"))
            .collect()
    }
}

/// Registry of canonicalized states already handed out, shared by both
/// search strategies within one run.
///
/// Two keys are tracked: the sorted relation history (same hypotheses
/// committed in a different order) and the sorted correspondence
/// strings (same mapping assembled from different hypotheses). Keys are
/// canonicalized before insertion so equivalent states collapse.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    relations: HashSet<Vec<PairMapping>>,
    mappings: HashSet<Vec<String>>,
}

impl DedupRegistry {
    /// Canonical form of a relation history: sorted.
    #[must_use]
    pub fn canonical_relations(relations: &[PairMapping]) -> Vec<PairMapping> {
        let mut key = relations.to_vec();
        key.sort();
        key
    }

    /// Canonical form of a correspondence set: sorted.
    #[must_use]
    pub fn canonical_mapping(mapping: &[String]) -> Vec<String> {
        let mut key = mapping.to_vec();
        key.sort();
        key
    }

    /// Whether this canonical relation history was already registered.
    #[must_use]
    pub fn seen_relations(&self, key: &[PairMapping]) -> bool {
        self.relations.contains(key)
    }

    /// Whether this canonical mapping signature was already registered.
    #[must_use]
    pub fn seen_mapping(&self, key: &[String]) -> bool {
        self.mappings.contains(key)
    }

    /// Register a canonical relation history; false if already present.
    pub fn insert_relations(&mut self, key: Vec<PairMapping>) -> bool {
        self.relations.insert(key)
    }

    /// Register a canonical mapping signature; false if already present.
    pub fn insert_mapping(&mut self, key: Vec<String>) -> bool {
        self.mappings.insert(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair::{enumerate_pair_mappings, PairMapping};
    use crate::relations::{NoStopwords, StaticRelations};
    use crate::score::{PairScorer, DEFAULT_CLUSTER_DISTANCE_THRESHOLD};
    use crate::similarity::LexicalOracle;

    fn entities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn filled_cache(base: &[String], target: &[String]) -> (ScoreCache, CandidateSet) {
        let relations = StaticRelations::new();
        let oracle = LexicalOracle::new();
        let stopwords = NoStopwords;
        let mut scorer = PairScorer::new(
            &relations,
            &oracle,
            &stopwords,
            DEFAULT_CLUSTER_DISTANCE_THRESHOLD,
        );
        let mut cache = ScoreCache::default();
        let set = CandidateSet::build(
            &mut scorer,
            &mut cache,
            enumerate_pair_mappings(base, target),
        );
        (cache, set)
    }

    #[test]
    fn test_commit_keeps_lists_aligned() {
        let base = entities(&["a", "b", "c"]);
        let target = entities(&["x", "y", "z"]);
        let (cache, _) = filled_cache(&base, &target);

        let mut state = Solution::empty(Vec::new());
        state.commit(&PairMapping::new("a", "b", "x", "y"), 1.5, 2, &cache);
        assert_eq!(state.base.len(), state.target.len());
        assert_eq!(state.length, 2);
        assert_eq!(state.mapping, vec!["a --> x", "b --> y"]);
        assert_eq!(state.scores, vec![1.5]);
        assert_eq!(state.coverage, vec![2]);
    }

    #[test]
    fn test_commit_with_one_known_entity_adds_one() {
        let base = entities(&["a", "b", "c"]);
        let target = entities(&["x", "y", "z"]);
        let (cache, _) = filled_cache(&base, &target);

        let mut state = Solution::empty(Vec::new());
        state.commit(&PairMapping::new("a", "b", "x", "y"), 0.0, 0, &cache);
        state.commit(&PairMapping::new("a", "c", "x", "z"), 0.0, 0, &cache);
        assert_eq!(state.length, 3);
        assert_eq!(state.mapping, vec!["a --> x", "b --> y", "c --> z"]);
    }

    #[test]
    #[should_panic(expected = "conflicting commit")]
    fn test_conflicting_commit_fails_fast() {
        let base = entities(&["a", "b", "c"]);
        let target = entities(&["x", "y", "z"]);
        let (cache, _) = filled_cache(&base, &target);

        let mut state = Solution::empty(Vec::new());
        state.commit(&PairMapping::new("a", "b", "x", "y"), 0.0, 0, &cache);
        // "a" is committed to "x"; pairing it with "z" crosses the mapping
        state.commit(&PairMapping::new("a", "c", "z", "x"), 0.0, 0, &cache);
    }

    #[test]
    fn test_admits_rejects_crossed_and_saturated_candidates() {
        let base = entities(&["a", "b", "c"]);
        let target = entities(&["x", "y", "z"]);
        let (cache, _) = filled_cache(&base, &target);

        let mut state = Solution::empty(Vec::new());
        state.commit(&PairMapping::new("a", "b", "x", "y"), 0.0, 0, &cache);

        // consistent extension
        assert!(state.admits(&PairMapping::new("a", "c", "x", "z")));
        // base entity mapped to the wrong target
        assert!(!state.admits(&PairMapping::new("a", "c", "y", "z")));
        // target entity mapped to the wrong base
        assert!(!state.admits(&PairMapping::new("c", "b", "x", "z")));
        // both base entities already committed
        assert!(!state.admits(&PairMapping::new("a", "b", "x", "y")));
        // both target entities already committed
        assert!(!state.admits(&PairMapping::new("c", "a", "y", "x")));
    }

    #[test]
    fn test_retain_available_shrinks_monotonically() {
        let base = entities(&["a", "b", "c"]);
        let target = entities(&["x", "y", "z"]);
        let (cache, set) = filled_cache(&base, &target);

        let mut state = Solution::empty(set.ranked_ids().to_vec());
        let before: Vec<u32> = state.available.clone();
        state.commit(&PairMapping::new("a", "b", "x", "y"), 0.0, 0, &cache);
        state.retain_available(&set);
        assert!(state.available.len() < before.len());
        assert!(state.available.iter().all(|id| before.contains(id)));
        // everything that survived really is consistent
        assert!(state
            .available
            .iter()
            .all(|&id| state.admits(set.mapping(id))));
    }

    #[test]
    fn test_dedup_registry_canonicalizes_order() {
        let mut registry = DedupRegistry::default();
        let first = vec![
            PairMapping::new("a", "b", "x", "y"),
            PairMapping::new("a", "c", "x", "z"),
        ];
        let second = vec![
            PairMapping::new("a", "c", "x", "z"),
            PairMapping::new("a", "b", "x", "y"),
        ];
        assert!(registry.insert_relations(DedupRegistry::canonical_relations(&first)));
        assert!(registry.seen_relations(&DedupRegistry::canonical_relations(&second)));

        let mapping_a = vec!["a --> x".to_string(), "b --> y".to_string()];
        let mapping_b = vec!["b --> y".to_string(), "a --> x".to_string()];
        assert!(registry.insert_mapping(DedupRegistry::canonical_mapping(&mapping_a)));
        assert!(!registry.insert_mapping(DedupRegistry::canonical_mapping(&mapping_b)));
    }

    #[test]
    fn test_solution_serializes_mapping_strings() {
        let base = entities(&["a", "b"]);
        let target = entities(&["x", "y"]);
        let (cache, _) = filled_cache(&base, &target);

        let mut state = Solution::empty(Vec::new());
        state.commit(&PairMapping::new("a", "b", "x", "y"), 1.0, 1, &cache);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["mapping"][0], "a --> x");
        assert_eq!(json["mapping"][1], "b --> y");
        assert_eq!(json["length"], 2);
    }
}
