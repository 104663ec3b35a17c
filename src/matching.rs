//! Minimum-cost full bipartite matching over relation evidence.
//!
//! Matching converts similarity into cost (`1 - similarity`, floored at
//! zero) and solves the assignment problem exactly, so every vertex of
//! the smaller side is matched and the kept edges maximize total
//! similarity. A side is either a raw phrase list or the groups produced
//! by [`crate::cluster::cluster_phrases`]; the two variants are
//! dispatched by [`MatchSide`] rather than by inspecting the data.

/// One side of a bipartite matching problem.
#[derive(Debug, Clone, Copy)]
pub enum MatchSide<'a> {
    /// Raw phrases; one vertex per phrase.
    Phrases(&'a [String]),
    /// Pre-clustered phrases; one vertex per cluster. Weights between
    /// clusters must be supplied by the caller (the per-cluster-pair
    /// maximum computed by the scorer).
    Clusters(&'a [Vec<String>]),
}

impl MatchSide<'_> {
    /// Number of vertices on this side.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            MatchSide::Phrases(p) => p.len(),
            MatchSide::Clusters(c) => c.len(),
        }
    }

    /// Whether this side has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One matched edge: side-local indices plus the similarity weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedEdge {
    /// Vertex index on the left side.
    pub left: usize,
    /// Vertex index on the right side.
    pub right: usize,
    /// Similarity weight of the kept edge.
    pub similarity: f64,
}

/// Cost stand-in for an edge the weight function declined to define.
/// Large enough that a forbidden edge is only ever chosen when a vertex
/// has no admissible partner at all, in which case it is dropped from
/// the result.
const FORBIDDEN: f64 = 1e9;

/// Maximum-similarity full matching of the smaller side.
///
/// `weight(l, r)` returns the similarity of left vertex `l` and right
/// vertex `r`, or `None` when the pair is inadmissible. Each vertex is
/// used at most once; when the sides have equal size and all weights are
/// defined, the matching is full. Returned edges are unsorted.
///
/// # Example
///
/// ```
/// use anamap::matching::{maximum_weighted_match, MatchSide};
///
/// let left: Vec<String> = ["pulls", "orbits"].iter().map(|s| s.to_string()).collect();
/// let right: Vec<String> = ["attracts", "circles"].iter().map(|s| s.to_string()).collect();
/// let sims = [[0.9, 0.8], [0.85, 0.1]];
/// let edges = maximum_weighted_match(
///     MatchSide::Phrases(&left),
///     MatchSide::Phrases(&right),
///     |l, r| Some(sims[l][r]),
/// );
/// // the greedy pick (0.9 + 0.1) loses to the full matching (0.8 + 0.85)
/// let total: f64 = edges.iter().map(|e| e.similarity).sum();
/// assert!((total - 1.65).abs() < 1e-9);
/// ```
pub fn maximum_weighted_match<W>(
    left: MatchSide<'_>,
    right: MatchSide<'_>,
    mut weight: W,
) -> Vec<MatchedEdge>
where
    W: FnMut(usize, usize) -> Option<f64>,
{
    let n_left = left.len();
    let n_right = right.len();
    if n_left == 0 || n_right == 0 {
        return Vec::new();
    }

    // square matrix, padded with zero-cost dummy rows/columns so the
    // solver always assigns the full smaller side to real partners
    let n = n_left.max(n_right);
    let mut similarities = vec![vec![None; n_right]; n_left];
    let mut cost = vec![vec![0.0_f64; n]; n];
    for (i, row) in cost.iter_mut().enumerate().take(n_left) {
        for (j, cell) in row.iter_mut().enumerate().take(n_right) {
            match weight(i, j) {
                Some(sim) => {
                    similarities[i][j] = Some(sim);
                    *cell = (1.0 - sim).max(0.0);
                }
                None => *cell = FORBIDDEN,
            }
        }
    }

    let assignment = min_cost_assignment(&cost);
    let mut edges = Vec::new();
    for (i, &j) in assignment.iter().enumerate().take(n_left) {
        if j < n_right {
            if let Some(sim) = similarities[i][j] {
                edges.push(MatchedEdge {
                    left: i,
                    right: j,
                    similarity: sim,
                });
            }
        }
    }
    edges
}

/// Exact minimum-cost assignment on a square cost matrix, O(n³)
/// Hungarian method with potentials (shortest augmenting paths).
///
/// Returns the column assigned to each row.
fn min_cost_assignment(cost: &[Vec<f64>]) -> Vec<usize> {
    let n = cost.len();
    // 1-indexed potentials; p[j] is the row matched to column j
    let mut u = vec![0.0_f64; n + 1];
    let mut v = vec![0.0_f64; n + 1];
    let mut p = vec![0_usize; n + 1];
    let mut way = vec![0_usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0_usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0_usize;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0_usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The exact solver never does worse than greedy assignment.
        #[test]
        fn at_least_as_good_as_greedy(
            sims in prop::collection::vec(prop::collection::vec(0.0f64..1.0, 3), 3),
        ) {
            let left: Vec<String> = (0..3).map(|i| format!("l{i}")).collect();
            let right: Vec<String> = (0..3).map(|i| format!("r{i}")).collect();
            let edges = maximum_weighted_match(
                MatchSide::Phrases(&left),
                MatchSide::Phrases(&right),
                |l, r| Some(sims[l][r]),
            );
            let total: f64 = edges.iter().map(|e| e.similarity).sum();

            // greedy: repeatedly take the heaviest remaining edge
            let sims_ref = &sims;
            let mut flat: Vec<(usize, usize, f64)> = (0..3)
                .flat_map(|l| (0..3).map(move |r| (l, r, sims_ref[l][r])))
                .collect();
            flat.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
            let mut used_l = [false; 3];
            let mut used_r = [false; 3];
            let mut greedy = 0.0;
            for (l, r, s) in flat {
                if !used_l[l] && !used_r[r] {
                    used_l[l] = true;
                    used_r[r] = true;
                    greedy += s;
                }
            }
            prop_assert!(total + 1e-9 >= greedy);
        }

        /// Every vertex is used at most once and the smaller side is covered.
        #[test]
        fn matching_is_injective_and_full(
            n_left in 1usize..5,
            n_right in 1usize..5,
            seed in 0u64..1000,
        ) {
            let left: Vec<String> = (0..n_left).map(|i| format!("l{i}")).collect();
            let right: Vec<String> = (0..n_right).map(|i| format!("r{i}")).collect();
            let edges = maximum_weighted_match(
                MatchSide::Phrases(&left),
                MatchSide::Phrases(&right),
                |l, r| {
                    // deterministic pseudo-weights
                    let h = (l as u64 + 1).wrapping_mul(31).wrapping_add(r as u64).wrapping_mul(seed + 7);
                    Some((h % 100) as f64 / 100.0)
                },
            );
            prop_assert_eq!(edges.len(), n_left.min(n_right));
            let lefts: std::collections::HashSet<_> = edges.iter().map(|e| e.left).collect();
            let rights: std::collections::HashSet<_> = edges.iter().map(|e| e.right).collect();
            prop_assert_eq!(lefts.len(), edges.len());
            prop_assert_eq!(rights.len(), edges.len());
        }
    }
}
