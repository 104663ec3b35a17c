//! Candidate scoring: relation clustering, bipartite matching, and the
//! memoized score machinery shared by both search strategies.
//!
//! Scoring one direction of a hypothesis means: fetch the relation
//! phrases of both entity pairs, cluster each side, weigh every cluster
//! pair by its best phrase-level similarity, solve a minimum-cost full
//! matching over the cluster graph, and keep the heaviest matched edges.
//! A candidate's total sums both directions. The exhaustive pass over
//! all enumerated candidates is the dominant cost of a mapping run
//! (20x20 domains already mean ~72,000 scored hypotheses), which is why
//! every relation fetch and oracle call is memoized here and every pair
//! score lands in the [`ScoreCache`] for O(1) incremental reuse.

use std::collections::HashMap;

use crate::cluster::{cluster_of, cluster_phrases};
use crate::matching::{maximum_weighted_match, MatchSide};
use crate::pair::{Pair, PairMapping};
use crate::relations::{RelationSource, StopwordFilter};
use crate::similarity::SimilarityOracle;

/// How many matched cluster edges count towards a direction's score.
pub const NUM_OF_CLUSTERS_TO_CALC: usize = 3;

/// Minimum similarity a matched cluster edge must exceed to count.
pub const EDGE_THRESHOLD: f64 = 0.2;

/// Default distance threshold for relation clustering.
pub const DEFAULT_CLUSTER_DISTANCE_THRESHOLD: f64 = 0.8;

/// Round to 3 decimals, the precision scores are reported at.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Score and coverage of a single direction of a hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DirectionScore {
    /// Sum of the kept matched cluster-edge weights, rounded to 3 decimals.
    pub score: f64,
    /// Relation evidence available: min of the two sides' phrase counts.
    pub coverage: usize,
}

/// Scores candidate hypotheses against the external collaborators,
/// memoizing every relation fetch and similarity call for the lifetime
/// of one mapping run.
pub struct PairScorer<'a> {
    relations: &'a dyn RelationSource,
    oracle: &'a dyn SimilarityOracle,
    stopwords: &'a dyn StopwordFilter,
    cluster_distance_threshold: f64,
    relation_cache: HashMap<Pair, Vec<String>>,
    similarity_cache: HashMap<(String, String), f64>,
}

impl<'a> PairScorer<'a> {
    /// Create a scorer over the given collaborators.
    pub fn new(
        relations: &'a dyn RelationSource,
        oracle: &'a dyn SimilarityOracle,
        stopwords: &'a dyn StopwordFilter,
        cluster_distance_threshold: f64,
    ) -> Self {
        Self {
            relations,
            oracle,
            stopwords,
            cluster_distance_threshold,
            relation_cache: HashMap::new(),
            similarity_cache: HashMap::new(),
        }
    }

    pub(crate) fn distance_threshold(&self) -> f64 {
        self.cluster_distance_threshold
    }

    /// Relation phrases of a directed entity pair: deduplicated, sorted,
    /// stopwords dropped, memoized.
    pub(crate) fn fetch_relations(&mut self, a: &str, b: &str) -> Vec<String> {
        let key = (a.to_string(), b.to_string());
        if let Some(cached) = self.relation_cache.get(&key) {
            return cached.clone();
        }
        let mut phrases = self.relations.relations(a, b);
        phrases.retain(|p| !self.stopwords.is_stopword(p));
        phrases.sort();
        phrases.dedup();
        self.relation_cache.insert(key, phrases.clone());
        phrases
    }

    /// Raw oracle similarity, memoized under a symmetric key.
    pub(crate) fn raw_similarity(&mut self, a: &str, b: &str) -> f64 {
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        if let Some(&cached) = self.similarity_cache.get(&key) {
            return cached;
        }
        let similarity = round3(self.oracle.similarity(a, b));
        self.similarity_cache.insert(key, similarity);
        similarity
    }

    /// Edge weight between two relation phrases: zero when either is a
    /// stopword, raw similarity otherwise.
    fn edge_score(&mut self, a: &str, b: &str) -> f64 {
        if self.stopwords.is_stopword(a) || self.stopwords.is_stopword(b) {
            0.0
        } else {
            self.raw_similarity(a, b)
        }
    }

    /// Score one direction of a hypothesis.
    ///
    /// Either side without relation evidence scores zero with zero
    /// coverage; the branch then dies naturally rather than erroring.
    pub fn score_direction(&mut self, mapping: &PairMapping) -> DirectionScore {
        let relations1 = self.fetch_relations(&mapping.base.0, &mapping.base.1);
        let relations2 = self.fetch_relations(&mapping.target.0, &mapping.target.1);
        if relations1.is_empty() || relations2.is_empty() {
            return DirectionScore::default();
        }

        let threshold = self.cluster_distance_threshold;
        let clusters1 = cluster_phrases(&relations1, threshold, |a, b| self.raw_similarity(a, b));
        let clusters2 = cluster_phrases(&relations2, threshold, |a, b| self.raw_similarity(a, b));

        // per cluster pair, keep only the heaviest phrase-level edge
        let mut weights: HashMap<(usize, usize), f64> = HashMap::new();
        for phrase1 in &relations1 {
            for phrase2 in &relations2 {
                let score = self.edge_score(phrase1, phrase2);
                let (Some(c1), Some(c2)) =
                    (cluster_of(&clusters1, phrase1), cluster_of(&clusters2, phrase2))
                else {
                    continue;
                };
                let entry = weights.entry((c1, c2)).or_insert(score);
                if score > *entry {
                    *entry = score;
                }
            }
        }

        let mut edges = maximum_weighted_match(
            MatchSide::Clusters(&clusters1),
            MatchSide::Clusters(&clusters2),
            |c1, c2| weights.get(&(c1, c2)).copied(),
        );
        edges.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let score = round3(
            edges
                .iter()
                .take(NUM_OF_CLUSTERS_TO_CALC)
                .filter(|e| e.similarity > EDGE_THRESHOLD)
                .map(|e| e.similarity)
                .sum(),
        );
        DirectionScore {
            score,
            coverage: relations1.len().min(relations2.len()),
        }
    }

    /// Score a full hypothesis: the literal sum of both directions'
    /// scores and coverages, with no normalization by how many
    /// directions had evidence.
    pub fn score_candidate(&mut self, mapping: &PairMapping) -> (f64, usize) {
        let forward = self.score_direction(mapping);
        let backward = self.score_direction(&mapping.reversed());
        (forward.score + backward.score, forward.coverage + backward.coverage)
    }
}

/// Memoized per-pair scores, keyed by the directed
/// ((base1, base2), (target1, target2)) tuple.
///
/// The initial exhaustive pass stores every scored candidate under both
/// orientations, so incrementally extending a partial mapping costs one
/// lookup per already-committed correspondence instead of a rescore.
#[derive(Debug, Default)]
pub struct ScoreCache {
    scores: HashMap<(Pair, Pair), f64>,
}

impl ScoreCache {
    /// Record a candidate's total score under both orientations.
    pub fn insert(&mut self, mapping: &PairMapping, score: f64) {
        let reversed = mapping.reversed();
        self.scores
            .insert((mapping.base.clone(), mapping.target.clone()), score);
        self.scores.insert((reversed.base, reversed.target), score);
    }

    /// Score gained by adding the correspondence `b -> t` to a partial
    /// mapping: the sum of the cached pair scores against every
    /// already-committed correspondence, rounded to 3 decimals.
    ///
    /// # Panics
    ///
    /// Panics when a committed pair was never scored. The exhaustive
    /// initial pass covers every combination the search can commit, so a
    /// miss is a programming error.
    #[must_use]
    pub fn incremental_score(&self, base: &[String], target: &[String], b: &str, t: &str) -> f64 {
        round3(
            base.iter()
                .zip(target.iter())
                .map(|(existing_b, existing_t)| {
                    let key = (
                        (existing_b.clone(), b.to_string()),
                        (existing_t.clone(), t.to_string()),
                    );
                    match self.scores.get(&key) {
                        Some(score) => *score,
                        None => panic!(
                            "score cache miss for (({existing_b}, {b}), ({existing_t}, {t}))"
                        ),
                    }
                })
                .sum(),
        )
    }

    /// Number of cached directed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// A candidate hypothesis with its score, produced by a ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMapping {
    /// The hypothesis in its enumerated orientation.
    pub mapping: PairMapping,
    /// Total both-direction score.
    pub score: f64,
    /// Total both-direction coverage.
    pub coverage: usize,
}

/// Score a list of hypotheses, populate the cache, and rank descending.
///
/// Ties keep enumeration order (the sort is stable). `depth` of zero
/// returns the full ranking; a positive depth truncates to the best
/// entries, which is how the suggestion completer restricts its pass.
pub(crate) fn rank_mappings(
    scorer: &mut PairScorer<'_>,
    cache: &mut ScoreCache,
    mappings: Vec<PairMapping>,
    depth: usize,
) -> Vec<RankedMapping> {
    let mut ranked: Vec<RankedMapping> = mappings
        .into_iter()
        .map(|mapping| {
            let (score, coverage) = scorer.score_candidate(&mapping);
            cache.insert(&mapping, score);
            RankedMapping {
                mapping,
                score,
                coverage,
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if depth > 0 {
        ranked.truncate(depth);
    }
    ranked
}

/// The enumerated candidate space with its initial exhaustive ranking.
///
/// Candidates are identified by their enumeration index; search states
/// keep id lists in rank order and only ever shrink them.
#[derive(Debug)]
pub struct CandidateSet {
    mappings: Vec<PairMapping>,
    scores: Vec<f64>,
    coverages: Vec<usize>,
    ranked: Vec<u32>,
}

impl CandidateSet {
    /// Score every enumerated candidate, populating the score cache, and
    /// build the descending initial ranking that seeds both search
    /// strategies.
    pub fn build(
        scorer: &mut PairScorer<'_>,
        cache: &mut ScoreCache,
        mappings: Vec<PairMapping>,
    ) -> Self {
        let mut scores = Vec::with_capacity(mappings.len());
        let mut coverages = Vec::with_capacity(mappings.len());
        for mapping in &mappings {
            let (score, coverage) = scorer.score_candidate(mapping);
            cache.insert(mapping, score);
            scores.push(score);
            coverages.push(coverage);
        }

        let mut ranked: Vec<u32> = (0..mappings.len() as u32).collect();
        ranked.sort_by(|&a, &b| {
            scores[b as usize]
                .partial_cmp(&scores[a as usize])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        log::debug!(
            "initial ranking pass scored {} candidates ({} cached pair scores)",
            mappings.len(),
            cache.len()
        );

        Self {
            mappings,
            scores,
            coverages,
            ranked,
        }
    }

    /// The hypothesis with the given id.
    #[must_use]
    pub fn mapping(&self, id: u32) -> &PairMapping {
        &self.mappings[id as usize]
    }

    /// Total score of the candidate with the given id.
    #[must_use]
    pub fn score(&self, id: u32) -> f64 {
        self.scores[id as usize]
    }

    /// Total coverage of the candidate with the given id.
    #[must_use]
    pub fn coverage(&self, id: u32) -> usize {
        self.coverages[id as usize]
    }

    /// Candidate ids in descending score order.
    #[must_use]
    pub fn ranked_ids(&self) -> &[u32] {
        &self.ranked
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Whether the candidate space is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
