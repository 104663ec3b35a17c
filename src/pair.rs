//! Candidate pair-mapping hypotheses and their enumeration.

use serde::{Deserialize, Serialize};

/// A directed (subject, object) entity pair within one domain.
pub type Pair = (String, String);

/// One orientation of a correspondence hypothesis: the claim that the
/// base entity pair maps onto the target entity pair positionally
/// (`base.0 -> target.0`, `base.1 -> target.1`).
///
/// A full hypothesis is always evaluated in both orientations; the other
/// one is obtained with [`PairMapping::reversed`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairMapping {
    /// The base-domain entity pair.
    pub base: Pair,
    /// The target-domain entity pair.
    pub target: Pair,
}

impl PairMapping {
    /// Create a new pair mapping.
    #[must_use]
    pub fn new(b1: impl Into<String>, b2: impl Into<String>, t1: impl Into<String>, t2: impl Into<String>) -> Self {
        Self {
            base: (b1.into(), b2.into()),
            target: (t1.into(), t2.into()),
        }
    }

    /// The opposite orientation of the same hypothesis.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            base: (self.base.1.clone(), self.base.0.clone()),
            target: (self.target.1.clone(), self.target.0.clone()),
        }
    }
}

impl std::fmt::Display for PairMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) ~ ({}, {})",
            self.base.0, self.base.1, self.target.0, self.target.1
        )
    }
}

/// Enumerate every candidate correspondence hypothesis between two
/// domains: each unordered base pair crossed with each ordered target
/// pair, i.e. `(m choose 2) * (n choose 2) * 2` mappings (2x2 -> 2,
/// 3x3 -> 18, 4x4 -> 72).
///
/// The enumeration is deterministic: base combinations in input order on
/// the outside, target combinations (forward orientations first, then
/// the flipped ones) on the inside. Growth is O(m²n²), which makes the
/// exhaustive scoring pass over the result the dominant cost of a
/// mapping run.
///
/// # Example
///
/// ```
/// use anamap::pair::enumerate_pair_mappings;
///
/// let base: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
/// let target: Vec<String> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(enumerate_pair_mappings(&base, &target).len(), 18);
/// ```
#[must_use]
pub fn enumerate_pair_mappings(base: &[String], target: &[String]) -> Vec<PairMapping> {
    let base_comb = unordered_pairs(base);
    let mut target_comb = unordered_pairs(target);
    let flipped: Vec<Pair> = target_comb.iter().map(|(a, b)| (b.clone(), a.clone())).collect();
    target_comb.extend(flipped);

    let mut mappings = Vec::with_capacity(base_comb.len() * target_comb.len());
    for base_pair in &base_comb {
        for target_pair in &target_comb {
            mappings.push(PairMapping {
                base: base_pair.clone(),
                target: target_pair.clone(),
            });
        }
    }
    mappings
}

fn unordered_pairs(entities: &[String]) -> Vec<Pair> {
    let mut pairs = Vec::new();
    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            pairs.push((entities[i].clone(), entities[j].clone()));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_enumeration_count() {
        let base = entities(&["a", "b"]);
        let target = entities(&["x", "y"]);
        // (2 choose 2) * (2 choose 2) * 2
        assert_eq!(enumerate_pair_mappings(&base, &target).len(), 2);

        let base = entities(&["a", "b", "c", "d"]);
        let target = entities(&["x", "y", "z", "w"]);
        // (4 choose 2) * (4 choose 2) * 2
        assert_eq!(enumerate_pair_mappings(&base, &target).len(), 72);
    }

    #[test]
    fn test_enumeration_deterministic() {
        let base = entities(&["a", "b", "c"]);
        let target = entities(&["x", "y"]);
        let first = enumerate_pair_mappings(&base, &target);
        let second = enumerate_pair_mappings(&base, &target);
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_small_domain_yields_nothing() {
        let base = entities(&["a"]);
        let target = entities(&["x", "y"]);
        assert!(enumerate_pair_mappings(&base, &target).is_empty());
    }

    #[test]
    fn test_reversed_is_involution() {
        let m = PairMapping::new("a", "b", "x", "y");
        assert_eq!(m.reversed().reversed(), m);
        assert_eq!(m.reversed(), PairMapping::new("b", "a", "y", "x"));
    }

    #[test]
    fn test_both_target_orientations_present() {
        let base = entities(&["a", "b"]);
        let target = entities(&["x", "y"]);
        let mappings = enumerate_pair_mappings(&base, &target);
        assert!(mappings.contains(&PairMapping::new("a", "b", "x", "y")));
        assert!(mappings.contains(&PairMapping::new("a", "b", "y", "x")));
    }
}
