//! Search strategies assembling full mappings from pair hypotheses.
//!
//! Both strategies consume the same per-invocation context: the scorer
//! with its memoized collaborator calls, the pair-score cache, the
//! dedup registry, and the enumerated candidate space with its initial
//! ranking. The context is threaded explicitly through the call graph -
//! nothing here is ambient or global - and lives exactly as long as one
//! mapping request.

mod beam;
mod dfs;

pub use beam::beam_search;
pub use dfs::depth_first_search;

use crate::score::{CandidateSet, PairScorer, ScoreCache};
use crate::state::{DedupRegistry, Solution};

/// Mutable per-invocation search state shared by both strategies.
pub struct SearchContext<'a> {
    /// Memoizing scorer over the external collaborators.
    pub scorer: PairScorer<'a>,
    /// Pair scores for O(1) incremental extension.
    pub cache: ScoreCache,
    /// Canonical-state registry shared across strategies and the
    /// suggestion completer.
    pub dedup: DedupRegistry,
    /// The enumerated candidate space with its initial ranking.
    pub candidates: CandidateSet,
    /// Caller-supplied branching bound (DFS fan-out, beam width).
    pub depth: usize,
    /// Maximum committed length: min(|base|, |target|).
    pub limit: usize,
}

impl SearchContext<'_> {
    /// The best remaining candidates of a state, bounded by the
    /// branching bound. The state's list is already filtered and in
    /// rank order, so this is a prefix.
    pub(crate) fn top_candidates(&self, state: &Solution) -> Vec<u32> {
        state.available.iter().copied().take(self.depth).collect()
    }
}
