//! Completion of near-complete solutions via an external
//! entity-suggestion service.
//!
//! When a top solution leaves exactly one entity of the larger domain
//! unmapped, its relations against the already-committed entities are
//! replayed through the suggestion service to propose plausible
//! counterparts, and one restricted scoring pass decides whether any of
//! them earns the missing correspondence. Finding nothing is a normal
//! outcome and leaves the solution untouched.

use std::collections::HashSet;

use crate::cluster::cluster_phrases;
use crate::pair::enumerate_pair_mappings;
use crate::score::rank_mappings;
use crate::search::SearchContext;
use crate::state::{DedupRegistry, Solution};

/// External service proposing entities that plausibly complete the
/// pattern `entity <relation> ?` or `? <relation> entity`.
pub trait EntitySuggester {
    /// Candidate entities for the given anchor entity and relation.
    fn suggest(&self, entity: &str, relation: &str) -> Vec<String>;
}

/// In-memory suggestion table for tests and offline callers.
#[derive(Debug, Clone, Default)]
pub struct StaticSuggestions {
    entries: std::collections::HashMap<(String, String), Vec<String>>,
}

impl StaticSuggestions {
    /// Create an empty suggestion table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the candidates for an (entity, relation) query.
    #[must_use]
    pub fn with_suggestions(mut self, entity: &str, relation: &str, candidates: &[&str]) -> Self {
        self.entries.insert(
            (entity.to_string(), relation.to_string()),
            candidates.iter().map(|c| c.to_string()).collect(),
        );
        self
    }
}

impl EntitySuggester for StaticSuggestions {
    fn suggest(&self, entity: &str, relation: &str) -> Vec<String> {
        self.entries
            .get(&(entity.to_string(), relation.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Pronouns and articles the suggestion services keep proposing.
const IGNORED_SUGGESTIONS: [&str; 6] = ["the", "they", "us", "we", "you", "i"];

/// How many of the top-ranked solutions are considered for completion.
const TOP_SOLUTIONS_FOR_SUGGESTIONS: usize = 3;

/// Try to complete the top solutions that are exactly one
/// correspondence short of covering the larger domain.
///
/// Returns the newly extended solutions; the inputs are never mutated.
pub(crate) fn complete_solutions(
    ctx: &mut SearchContext<'_>,
    suggester: &dyn EntitySuggester,
    base: &[String],
    target: &[String],
    solutions: &[Solution],
    num_of_suggestions: usize,
) -> Vec<Solution> {
    let mut extended = Vec::new();
    let larger = base.len().max(target.len());
    if num_of_suggestions == 0 || larger < 2 {
        return extended;
    }
    let wanted_length = larger - 1;

    // rank without disturbing the caller's list
    let mut order: Vec<&Solution> = solutions.iter().filter(|s| s.length > 0).collect();
    order.sort_by(|a, b| {
        b.length.cmp(&a.length).then_with(|| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    for solution in order
        .into_iter()
        .take(TOP_SOLUTIONS_FOR_SUGGESTIONS)
        .filter(|s| s.length == wanted_length)
    {
        complete_domain(ctx, suggester, base, solution, Domain::Base, num_of_suggestions, &mut extended);
        complete_domain(ctx, suggester, target, solution, Domain::Target, num_of_suggestions, &mut extended);
    }
    extended
}

#[derive(Clone, Copy, PartialEq)]
enum Domain {
    Base,
    Target,
}

fn complete_domain(
    ctx: &mut SearchContext<'_>,
    suggester: &dyn EntitySuggester,
    domain_entities: &[String],
    solution: &Solution,
    domain: Domain,
    num_of_suggestions: usize,
    extended: &mut Vec<Solution>,
) {
    let (committed, counterparts) = match domain {
        Domain::Base => (&solution.base, &solution.target),
        Domain::Target => (&solution.target, &solution.base),
    };

    for missing in domain_entities.iter().filter(|e| !committed.contains(*e)) {
        let candidates = gather_candidates(ctx, suggester, missing, committed, counterparts);
        if candidates.is_empty() {
            log::debug!("no completion candidates for {missing}");
            continue;
        }
        let representatives = cluster_representatives(ctx, candidates);

        // extend the opposite domain with the representatives and replay
        // the usual enumerate-filter-score pipeline, restricted
        let (new_base, new_target) = match domain {
            Domain::Base => {
                let mut b = solution.base.clone();
                b.push(missing.clone());
                let mut t = solution.target.clone();
                t.extend(representatives);
                (b, t)
            }
            Domain::Target => {
                let mut b = solution.base.clone();
                b.extend(representatives);
                let mut t = solution.target.clone();
                t.push(missing.clone());
                (b, t)
            }
        };

        let admissible: Vec<_> = enumerate_pair_mappings(&new_base, &new_target)
            .into_iter()
            .filter(|m| solution.admits(m))
            .collect();
        let ranked = rank_mappings(&mut ctx.scorer, &mut ctx.cache, admissible, num_of_suggestions);

        for best in ranked {
            if best.score <= 0.0 {
                continue;
            }
            let mut child = solution.clone();
            child.commit(&best.mapping, best.score, best.coverage, &ctx.cache);
            if !ctx
                .dedup
                .insert_mapping(DedupRegistry::canonical_mapping(&child.mapping))
            {
                continue;
            }
            // occasionally a service proposes the entity itself
            if child.base.last() == child.target.last() {
                continue;
            }
            if !ctx
                .dedup
                .insert_relations(DedupRegistry::canonical_relations(&child.relations))
            {
                continue;
            }
            let suggested = match domain {
                Domain::Base => child.target.last(),
                Domain::Target => child.base.last(),
            };
            if let Some(entity) = suggested {
                child.suggestions.push(entity.clone());
            }
            extended.push(child);
        }
    }
}

/// All plausible counterparts of a missing entity, each remembering the
/// relation that produced it: relations between the missing entity and
/// every committed same-domain entity, replayed through the suggestion
/// service keyed by the committed entity's counterpart.
fn gather_candidates(
    ctx: &mut SearchContext<'_>,
    suggester: &dyn EntitySuggester,
    missing: &str,
    committed: &[String],
    counterparts: &[String],
) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for (anchor, counterpart) in committed.iter().zip(counterparts.iter()) {
        let mut relations = ctx.scorer.fetch_relations(anchor, missing);
        relations.extend(ctx.scorer.fetch_relations(missing, anchor));
        relations.sort();
        relations.dedup();

        for relation in relations {
            for candidate in suggester.suggest(counterpart, &relation) {
                if IGNORED_SUGGESTIONS.contains(&candidate.as_str()) {
                    continue;
                }
                if candidate.split_whitespace().count() > 2 {
                    continue;
                }
                if seen.insert(candidate.clone()) {
                    candidates.push((candidate, relation.clone()));
                }
            }
        }
    }
    candidates
}

/// Cluster candidates by the similarity of their source relations and
/// keep one representative per cluster, in first-appearance order.
fn cluster_representatives(
    ctx: &mut SearchContext<'_>,
    candidates: Vec<(String, String)>,
) -> Vec<String> {
    if candidates.len() <= 1 {
        return candidates.into_iter().map(|(c, _)| c).collect();
    }

    let mut distinct_relations: Vec<String> = Vec::new();
    for (_, relation) in &candidates {
        if !distinct_relations.contains(relation) {
            distinct_relations.push(relation.clone());
        }
    }

    let threshold = ctx.scorer.distance_threshold();
    let clusters = cluster_phrases(&distinct_relations, threshold, |a, b| {
        ctx.scorer.raw_similarity(a, b)
    });

    let mut representatives = Vec::new();
    for cluster in clusters {
        let found = candidates
            .iter()
            .find(|(_, relation)| cluster.iter().any(|r| r == relation));
        if let Some((candidate, _)) = found {
            if !representatives.contains(candidate) {
                representatives.push(candidate.clone());
            }
        }
    }
    representatives
}
