//! Average-linkage agglomerative clustering of relation phrases.
//!
//! Phrases on each side of a candidate hypothesis are grouped before
//! matching so that near-paraphrases ("revolves around", "orbits") count
//! as one piece of evidence instead of several. Distance is cosine
//! distance, i.e. `1 - similarity`.

/// Cluster phrases by average-linkage agglomerative clustering.
///
/// Starts from singleton clusters and repeatedly merges the pair of
/// clusters with the smallest average pairwise distance, stopping once
/// that minimum reaches `distance_threshold` (clusters at or above the
/// threshold are never merged). A singleton input yields a singleton
/// group without consulting the similarity function.
///
/// The output order is deterministic: clusters appear in first-member
/// input order, members in input order.
///
/// # Example
///
/// ```
/// use anamap::cluster::cluster_phrases;
///
/// let phrases: Vec<String> = ["orbits", "orbits", "binds to"]
///     .iter().map(|s| s.to_string()).collect();
/// let clusters = cluster_phrases(&phrases, 0.8, |a, b| if a == b { 1.0 } else { 0.0 });
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters[0].len(), 2);
/// ```
pub fn cluster_phrases<F>(
    phrases: &[String],
    distance_threshold: f64,
    mut similarity: F,
) -> Vec<Vec<String>>
where
    F: FnMut(&str, &str) -> f64,
{
    if phrases.is_empty() {
        return Vec::new();
    }
    if phrases.len() == 1 {
        return vec![vec![phrases[0].clone()]];
    }

    let n = phrases.len();
    let mut distance = vec![vec![0.0_f64; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (1.0 - similarity(&phrases[i], &phrases[j])).max(0.0);
            distance[i][j] = d;
            distance[j][i] = d;
        }
    }

    // clusters hold member indices; merge into the lower-indexed cluster
    let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();
    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in 0..clusters.len() {
            for b in (a + 1)..clusters.len() {
                let d = average_linkage(&clusters[a], &clusters[b], &distance);
                if best.map_or(true, |(_, _, best_d)| d < best_d) {
                    best = Some((a, b, d));
                }
            }
        }
        match best {
            Some((a, b, d)) if d < distance_threshold => {
                let merged = clusters.remove(b);
                clusters[a].extend(merged);
            }
            _ => break,
        }
    }

    clusters
        .into_iter()
        .map(|members| members.into_iter().map(|i| phrases[i].clone()).collect())
        .collect()
}

/// Index of the cluster containing `phrase`, if any.
#[must_use]
pub fn cluster_of(clusters: &[Vec<String>], phrase: &str) -> Option<usize> {
    clusters.iter().position(|c| c.iter().any(|p| p == phrase))
}

fn average_linkage(a: &[usize], b: &[usize], distance: &[Vec<f64>]) -> f64 {
    let mut sum = 0.0;
    for &i in a {
        for &j in b {
            sum += distance[i][j];
        }
    }
    sum / (a.len() * b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::string_similarity;

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        let clusters = cluster_phrases(&[], 0.8, |_, _| 0.0);
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_singleton_input_skips_similarity() {
        let input = phrases(&["orbits"]);
        // the similarity function must never be consulted for one phrase
        let clusters = cluster_phrases(&input, 0.8, |_, _| panic!("similarity called"));
        assert_eq!(clusters, vec![vec!["orbits".to_string()]]);
    }

    #[test]
    fn test_dissimilar_phrases_stay_apart() {
        let input = phrases(&["orbits", "binds to"]);
        let clusters = cluster_phrases(&input, 0.8, |a, b| string_similarity(a, b));
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_similar_phrases_merge() {
        // distance 1 - 0.8 = 0.2, well below the 0.8 threshold
        let input = phrases(&["revolves around", "revolves"]);
        let clusters = cluster_phrases(&input, 0.8, |a, b| string_similarity(a, b));
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 2);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // distance exactly at the threshold must not merge
        let input = phrases(&["a", "b"]);
        let clusters = cluster_phrases(&input, 0.5, |_, _| 0.5);
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_average_linkage_chains() {
        // "a" and "b" are close; "c" is close to "b" but the merged
        // {a,b} cluster averages it out of reach
        let input = phrases(&["a", "b", "c"]);
        let clusters = cluster_phrases(&input, 0.35, |x, y| match (x, y) {
            ("a", "b") | ("b", "a") => 0.9,
            ("b", "c") | ("c", "b") => 0.7,
            _ => 0.0,
        });
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], phrases(&["a", "b"]));
        assert_eq!(clusters[1], phrases(&["c"]));
    }

    #[test]
    fn test_cluster_of() {
        let clusters = vec![phrases(&["a", "b"]), phrases(&["c"])];
        assert_eq!(cluster_of(&clusters, "b"), Some(0));
        assert_eq!(cluster_of(&clusters, "c"), Some(1));
        assert_eq!(cluster_of(&clusters, "d"), None);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn clustering_partitions_input(
            input in prop::collection::hash_set("[a-f]{1,4}", 1..8),
            threshold in 0.1f64..0.9,
        ) {
            let input: Vec<String> = input.into_iter().collect();
            let clusters = cluster_phrases(&input, threshold, |a, b| {
                crate::similarity::string_similarity(a, b)
            });
            let flattened: Vec<String> = clusters.iter().flatten().cloned().collect();
            let mut sorted_in = input.clone();
            sorted_in.sort();
            let mut sorted_out = flattened;
            sorted_out.sort();
            prop_assert_eq!(sorted_in, sorted_out);
            prop_assert!(clusters.iter().all(|c| !c.is_empty()));
        }
    }
}
