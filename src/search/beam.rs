//! Beam-search assembly of mappings from ranked pair hypotheses.

use super::SearchContext;
use crate::state::{DedupRegistry, Solution};

/// Beam search over the candidate space.
///
/// Keeps exactly `width` states. Each round extends every state with
/// its best `width` remaining candidates, merges the children with the
/// incumbents, sorts by (committed length, cumulative score) and
/// truncates back to `width`; the loop ends the first round no state
/// yields a fresh child. Bounded memory and cost, at the price of the
/// completeness DFS's branching gives up less of.
pub fn beam_search(ctx: &mut SearchContext<'_>, width: usize) -> Vec<Solution> {
    let mut beam: Vec<Solution> = (0..width)
        .map(|_| Solution::empty(ctx.candidates.ranked_ids().to_vec()))
        .collect();

    let mut round = 0_usize;
    loop {
        let mut fresh = Vec::new();
        for state in &beam {
            if state.length == ctx.limit {
                continue;
            }
            for id in ctx.top_candidates(state) {
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
                // the relation history registers even when the mapping
                // signature later rejects the child
                if !ctx
                    .dedup
                    .insert_relations(DedupRegistry::canonical_relations(&child.relations))
                {
                    continue;
                }
                if !ctx
                    .dedup
                    .insert_mapping(DedupRegistry::canonical_mapping(&child.mapping))
                {
                    continue;
                }
                child.retain_available(&ctx.candidates);
                fresh.push(child);
            }
        }

        if fresh.is_empty() {
            break;
        }
        round += 1;
        log::debug!("beam round {round}: {} fresh states", fresh.len());

        // incumbents first so the stable sort prefers them on ties
        beam.extend(fresh);
        beam.sort_by(|a, b| {
            b.length.cmp(&a.length).then_with(|| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });
        beam.truncate(width);
    }

    beam
}
