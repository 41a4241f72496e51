//! The per-month citation-count multiset.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Citation counts of every paper in a month, one entry per paper.
///
/// Order carries no meaning: two distributions are equal when they hold the
/// same counts with the same multiplicities. Entries are never deduplicated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationDistribution {
    counts: Vec<u32>,
}

impl CitationDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    pub fn push(&mut self, citations: u32) {
        self.counts.push(citations);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Raw counts in insertion order.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Papers with at least `citations` citations.
    pub fn count_at_least(&self, citations: u32) -> usize {
        self.counts.iter().filter(|&&c| c >= citations).count()
    }

    /// Papers with strictly more than `citations` citations.
    pub fn count_greater_than(&self, citations: u32) -> usize {
        self.counts.iter().filter(|&&c| c > citations).count()
    }

    /// Citation count → number of papers with that count.
    pub fn histogram(&self) -> BTreeMap<u32, usize> {
        let mut hist = BTreeMap::new();
        for &c in &self.counts {
            *hist.entry(c).or_insert(0) += 1;
        }
        hist
    }
}

impl PartialEq for CitationDistribution {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.histogram() == other.histogram()
    }
}

impl Eq for CitationDistribution {}

impl Extend<u32> for CitationDistribution {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        self.counts.extend(iter);
    }
}

impl FromIterator<u32> for CitationDistribution {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_order() {
        let a = CitationDistribution::from_counts(vec![0, 0, 1, 3, 5, 12]);
        let b = CitationDistribution::from_counts(vec![12, 5, 3, 1, 0, 0]);
        assert_eq!(a, b);
    }

    #[test]
    fn equality_respects_multiplicity() {
        let a = CitationDistribution::from_counts(vec![0, 0, 1]);
        let b = CitationDistribution::from_counts(vec![0, 1, 1]);
        assert_ne!(a, b);
    }

    #[test]
    fn threshold_counts() {
        let d: CitationDistribution = [0, 0, 1, 3, 5, 12].into_iter().collect();
        assert_eq!(d.count_at_least(3), 3);
        assert_eq!(d.count_greater_than(3), 2);
        assert_eq!(d.count_at_least(0), 6);
        assert_eq!(d.count_greater_than(12), 0);
    }

    #[test]
    fn histogram_groups_counts() {
        let d = CitationDistribution::from_counts(vec![2, 0, 2, 7]);
        let hist = d.histogram();
        assert_eq!(hist.get(&0), Some(&1));
        assert_eq!(hist.get(&2), Some(&2));
        assert_eq!(hist.get(&7), Some(&1));
    }

    #[test]
    fn extend_appends_without_dedup() {
        let mut d = CitationDistribution::new();
        d.extend([1, 1]);
        d.push(1);
        assert_eq!(d.len(), 3);
    }
}
