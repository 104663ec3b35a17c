//! # anamap
//!
//! Analogical mapping between entity lists.
//!
//! Given a "base" and a "target" domain (two entity lists), the engine
//! searches the combinatorial space of entity-to-entity correspondences
//! and scores each candidate by how well the *relations* attached to
//! corresponding entity pairs align semantically. "sun : earth" maps to
//! "nucleus : electrons" not because the words look alike, but because
//! both pairs are connected by phrases like "attracts" and "revolves
//! around".
//!
//! ## Pipeline
//!
//! ```text
//! enumerate 2-to-2 hypotheses        (m choose 2)·(n choose 2)·2
//!   └─> exhaustive scoring pass      clustering + bipartite matching
//!         └─> search (dfs | beam)    incremental commits, dedup, pruning
//!               └─> suggestions      complete near-full solutions
//!                     └─> ranking    (length desc, score desc), truncate
//! ```
//!
//! The exhaustive pass is the dominant cost center (20x20 domains mean
//! ~72,000 scored hypotheses); everything downstream reuses its scores
//! through a per-run cache and costs one lookup per committed
//! correspondence.
//!
//! ## External collaborators
//!
//! Relation retrieval, semantic similarity, stopword filtering, and
//! entity suggestion are boundaries, not implementations: wire in
//! whatever knowledge sources and embedding model you have by
//! implementing [`RelationSource`], [`SimilarityOracle`],
//! [`StopwordFilter`], and [`EntitySuggester`]. In-memory
//! implementations ([`StaticRelations`], [`LexicalOracle`],
//! [`TableOracle`], [`StaticSuggestions`]) cover tests and offline use.
//! Collaborator failures are invisible here - a collaborator always
//! returns a (possibly empty) result, and empty evidence simply scores
//! zero.
//!
//! ## Quick start
//!
//! ```rust
//! use anamap::prelude::*;
//!
//! let base: Vec<String> = ["sun", "earth"].iter().map(|s| s.to_string()).collect();
//! let target: Vec<String> = ["nucleus", "electrons"].iter().map(|s| s.to_string()).collect();
//!
//! let relations = StaticRelations::new()
//!     .with_relations("sun", "earth", &["attracts"])
//!     .with_relations("earth", "sun", &["revolves around"])
//!     .with_relations("nucleus", "electrons", &["attracts"])
//!     .with_relations("electrons", "nucleus", &["revolves around"]);
//! let oracle = LexicalOracle::new();
//! let stopwords = NoStopwords;
//!
//! let collaborators = Collaborators::new(&relations, &oracle, &stopwords);
//! let solutions = map_entities(&base, &target, &collaborators, &MappingConfig::default())?;
//!
//! assert_eq!(solutions[0].mapping, vec!["sun --> nucleus", "earth --> electrons"]);
//! # Ok::<(), anamap::Error>(())
//! ```
//!
//! ## What this is not
//!
//! The search is heuristic and pruned, not exhaustive beyond small
//! inputs, so it does not guarantee a globally optimal mapping. It does
//! no natural-language understanding of free text, and it trains
//! nothing - the similarity oracle arrives fixed.

#![warn(missing_docs)]

pub mod cluster;
pub mod error;
pub mod matching;
pub mod pair;
pub mod rank;
pub mod relations;
pub mod score;
pub mod search;
pub mod similarity;
pub mod state;
pub mod suggest;

pub use error::{Error, Result};
pub use pair::{enumerate_pair_mappings, Pair, PairMapping};
pub use rank::rank_solutions;
pub use relations::{
    FrequencyStopwords, NoStopwords, RelationSource, StaticRelations, StopwordFilter, StopwordList,
};
pub use score::{
    CandidateSet, PairScorer, ScoreCache, DEFAULT_CLUSTER_DISTANCE_THRESHOLD, EDGE_THRESHOLD,
    NUM_OF_CLUSTERS_TO_CALC,
};
pub use search::{beam_search, depth_first_search, SearchContext};
pub use similarity::{EmbeddingOracle, LexicalOracle, SimilarityOracle, TableOracle};
pub use state::{DedupRegistry, Solution};
pub use suggest::{EntitySuggester, StaticSuggestions};

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use anamap::prelude::*;
    //!
    //! let config = MappingConfig::default().with_algorithm(Algorithm::Dfs);
    //! assert_eq!(config.algorithm, Algorithm::Dfs);
    //! ```
    pub use crate::error::{Error, Result};
    pub use crate::pair::{Pair, PairMapping};
    pub use crate::relations::{
        FrequencyStopwords, NoStopwords, RelationSource, StaticRelations, StopwordFilter,
        StopwordList,
    };
    pub use crate::similarity::{
        EmbeddingOracle, LexicalOracle, SimilarityOracle, TableOracle,
    };
    pub use crate::state::Solution;
    pub use crate::suggest::{EntitySuggester, StaticSuggestions};
    pub use crate::{map_entities, Algorithm, Collaborators, MappingConfig};
}

/// Search strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// Depth-first search: records every visited partial state.
    Dfs,
    /// Beam search: keeps a fixed number of best states per round.
    Beam,
}

impl std::str::FromStr for Algorithm {
    type Err = Error;

    /// Parse `"dfs"` or `"beam"`. Anything else is a configuration
    /// error, reported before any search work begins.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dfs" => Ok(Algorithm::Dfs),
            "beam" => Ok(Algorithm::Beam),
            other => Err(Error::unsupported_algorithm(other)),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Dfs => write!(f, "dfs"),
            Algorithm::Beam => write!(f, "beam"),
        }
    }
}

/// The external collaborators one mapping run works against.
///
/// All of them are treated as pure for the duration of the run; the
/// engine memoizes their answers and never retries them.
pub struct Collaborators<'a> {
    /// Relation phrases per directed entity pair.
    pub relations: &'a dyn RelationSource,
    /// Semantic similarity of two phrases.
    pub oracle: &'a dyn SimilarityOracle,
    /// Marks phrases too generic to count as evidence.
    pub stopwords: &'a dyn StopwordFilter,
    /// Entity suggestions for completing near-full solutions; without
    /// one, the completion step is skipped.
    pub suggester: Option<&'a dyn EntitySuggester>,
}

impl<'a> Collaborators<'a> {
    /// Bundle the three mandatory collaborators.
    #[must_use]
    pub fn new(
        relations: &'a dyn RelationSource,
        oracle: &'a dyn SimilarityOracle,
        stopwords: &'a dyn StopwordFilter,
    ) -> Self {
        Self {
            relations,
            oracle,
            stopwords,
            suggester: None,
        }
    }

    /// Attach an entity-suggestion service.
    #[must_use]
    pub fn with_suggester(mut self, suggester: &'a dyn EntitySuggester) -> Self {
        self.suggester = Some(suggester);
        self
    }
}

/// Configuration of one mapping run.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    /// Search strategy.
    pub algorithm: Algorithm,
    /// Branching bound: DFS fan-out per level, beam width.
    pub depth: usize,
    /// How many completions the suggestion step may commit per missing
    /// entity; zero disables the step.
    pub num_of_suggestions: usize,
    /// How many ranked solutions to return.
    pub max_solutions: usize,
    /// Distance threshold for relation clustering.
    pub cluster_distance_threshold: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Beam,
            depth: 4,
            num_of_suggestions: 1,
            max_solutions: 10,
            cluster_distance_threshold: DEFAULT_CLUSTER_DISTANCE_THRESHOLD,
        }
    }
}

impl MappingConfig {
    /// Set the search strategy.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the branching bound.
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Set the number of committed suggestions per missing entity.
    #[must_use]
    pub fn with_suggestions(mut self, num_of_suggestions: usize) -> Self {
        self.num_of_suggestions = num_of_suggestions;
        self
    }

    /// Set the number of returned solutions.
    #[must_use]
    pub fn with_max_solutions(mut self, max_solutions: usize) -> Self {
        self.max_solutions = max_solutions;
        self
    }

    /// Set the distance threshold for relation clustering.
    #[must_use]
    pub fn with_cluster_distance_threshold(mut self, threshold: f64) -> Self {
        self.cluster_distance_threshold = threshold;
        self
    }
}

/// Map the base domain onto the target domain.
///
/// Enumerates every 2-to-2 correspondence hypothesis, scores them all
/// once (the dominant cost - O(m²n²) hypotheses), runs the configured
/// search strategy, optionally completes near-full solutions through
/// the suggestion service, and returns the ranked solutions.
///
/// An empty result is a normal outcome: domains too small to form
/// pairs, or relation sources with no usable evidence, simply produce
/// no solutions.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the branching bound is zero.
/// An unsupported algorithm name surfaces earlier, at
/// [`Algorithm::from_str`].
pub fn map_entities(
    base: &[String],
    target: &[String],
    collaborators: &Collaborators<'_>,
    config: &MappingConfig,
) -> Result<Vec<Solution>> {
    if config.depth == 0 {
        return Err(Error::invalid_input("branching bound must be positive"));
    }

    let candidates = enumerate_pair_mappings(base, target);
    log::debug!(
        "mapping {}x{} domains with {}: {} candidate hypotheses",
        base.len(),
        target.len(),
        config.algorithm,
        candidates.len()
    );

    let mut scorer = PairScorer::new(
        collaborators.relations,
        collaborators.oracle,
        collaborators.stopwords,
        config.cluster_distance_threshold,
    );
    let mut cache = ScoreCache::default();
    let candidate_set = CandidateSet::build(&mut scorer, &mut cache, candidates);

    let mut ctx = SearchContext {
        scorer,
        cache,
        dedup: DedupRegistry::default(),
        candidates: candidate_set,
        depth: config.depth,
        limit: base.len().min(target.len()),
    };

    let mut solutions = match config.algorithm {
        Algorithm::Dfs => depth_first_search(&mut ctx),
        Algorithm::Beam => beam_search(&mut ctx, config.depth),
    };

    if let Some(suggester) = collaborators.suggester {
        let extended = suggest::complete_solutions(
            &mut ctx,
            suggester,
            base,
            target,
            &solutions,
            config.num_of_suggestions,
        );
        solutions.extend(extended);
    }

    Ok(rank_solutions(solutions, config.max_solutions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!(Algorithm::from_str("dfs").unwrap(), Algorithm::Dfs);
        assert_eq!(Algorithm::from_str("beam").unwrap(), Algorithm::Beam);
        assert!(matches!(
            Algorithm::from_str("exhaustive"),
            Err(Error::UnsupportedAlgorithm(_))
        ));
        // case is not normalized
        assert!(Algorithm::from_str("DFS").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = MappingConfig::default();
        assert_eq!(config.algorithm, Algorithm::Beam);
        assert_eq!(config.depth, 4);
        assert_eq!(config.num_of_suggestions, 1);
        assert_eq!(config.max_solutions, 10);
    }

    #[test]
    fn test_zero_depth_is_invalid() {
        let relations = StaticRelations::new();
        let oracle = LexicalOracle::new();
        let stopwords = NoStopwords;
        let collaborators = Collaborators::new(&relations, &oracle, &stopwords);
        let config = MappingConfig::default().with_depth(0);
        let result = map_entities(&[], &[], &collaborators, &config);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
