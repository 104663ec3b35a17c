//! Final ordering and truncation of search output.

use crate::state::Solution;

/// Order solutions by (committed length desc, cumulative score desc),
/// drop empty states, and truncate to the caller-requested count.
///
/// The sort is stable, so solutions tied on both keys keep the order
/// the search produced them in; given fixed input and collaborator
/// responses the result is fully deterministic. A longer mapping always
/// outranks a shorter one regardless of score - score only breaks
/// length ties.
#[must_use]
pub fn rank_solutions(mut solutions: Vec<Solution>, limit: usize) -> Vec<Solution> {
    solutions.retain(|s| s.length > 0);
    solutions.sort_by(|a, b| {
        b.length.cmp(&a.length).then_with(|| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    solutions.truncate(limit);
    solutions
}
