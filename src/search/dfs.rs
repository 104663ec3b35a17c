//! Depth-first assembly of mappings from ranked pair hypotheses.

use super::SearchContext;
use crate::state::{DedupRegistry, Solution};

/// Depth-first search over the candidate space.
///
/// Every visited non-root state is recorded as an output solution -
/// partial mappings included, not only leaves - unless the dedup
/// registry has already seen an equivalent state reached through a
/// different commit order. Branching at each level is bounded by the
/// context's `depth`; a branch terminates when the committed length
/// reaches min(|base|, |target|) or no positive-score extension
/// remains.
pub fn depth_first_search(ctx: &mut SearchContext<'_>) -> Vec<Solution> {
    let root = Solution::empty(ctx.candidates.ranked_ids().to_vec());
    let mut solutions = Vec::new();
    visit(ctx, root, &mut solutions);
    log::debug!("depth-first search recorded {} solutions", solutions.len());
    solutions
}

fn visit(ctx: &mut SearchContext<'_>, state: Solution, solutions: &mut Vec<Solution>) {
    if !state.base.is_empty() {
        // drop states already seen in a different commit order; a known
        // relation history is checked first and registers nothing else
        let relations_key = DedupRegistry::canonical_relations(&state.relations);
        if ctx.dedup.seen_relations(&relations_key) {
            return;
        }
        let mapping_key = DedupRegistry::canonical_mapping(&state.mapping);
        if ctx.dedup.seen_mapping(&mapping_key) {
            return;
        }
        ctx.dedup.insert_relations(relations_key);
        ctx.dedup.insert_mapping(mapping_key);
        solutions.push(state.clone());
    }

    if state.length == ctx.limit {
        return;
    }

    for id in ctx.top_candidates(&state) {
        if ctx.candidates.score(id) <= 0.0 {
            continue;
        }
        let mut child = state.clone();
        child.commit(
            ctx.candidates.mapping(id),
            ctx.candidates.score(id),
            ctx.candidates.coverage(id),
            &ctx.cache,
        );
        child.retain_available(&ctx.candidates);
        visit(ctx, child, solutions);
    }
}
