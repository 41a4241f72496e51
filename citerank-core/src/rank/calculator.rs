//! Rank calculator.

use crate::domain::{CitationDistribution, RankStats};
use crate::error::RankError;

/// Percentile standing of `target` within `distribution`.
///
/// `percentage` counts papers with at least as many citations as the target,
/// `percentage_upper` only those with strictly more, so
/// `0 <= percentage_upper <= percentage <= 100`. Lower is better.
pub fn compute_rank(
    target: u32,
    distribution: &CitationDistribution,
) -> Result<RankStats, RankError> {
    let total = distribution.len();
    if total == 0 {
        return Err(RankError::EmptyDistribution);
    }

    let greater_citations = distribution.count_at_least(target);
    let strictly_greater = distribution.count_greater_than(target);
    let percentage = 100.0 * greater_citations as f64 / total as f64;
    let percentage_upper = 100.0 * strictly_greater as f64 / total as f64;

    Ok(RankStats {
        greater_citations,
        strictly_greater,
        total,
        percentage,
        percentage_upper,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(counts: &[u32]) -> CitationDistribution {
        CitationDistribution::from_counts(counts.to_vec())
    }

    #[test]
    fn mid_distribution_target() {
        let stats = compute_rank(3, &dist(&[0, 0, 1, 3, 5, 12])).unwrap();
        assert_eq!(stats.greater_citations, 3);
        assert_eq!(stats.strictly_greater, 2);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.percentage, 50.0);
        assert!((stats.percentage_upper - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn all_tied_at_zero() {
        let stats = compute_rank(0, &dist(&[0, 0, 0])).unwrap();
        assert_eq!(stats.percentage, 100.0);
        assert_eq!(stats.percentage_upper, 0.0);
    }

    #[test]
    fn above_everything_is_rank_zero() {
        let stats = compute_rank(99, &dist(&[1, 4, 20])).unwrap();
        assert_eq!(stats.greater_citations, 0);
        assert_eq!(stats.percentage, 0.0);
        assert_eq!(stats.percentage_upper, 0.0);
    }

    #[test]
    fn below_everything_is_rank_hundred() {
        let stats = compute_rank(0, &dist(&[1, 4, 20])).unwrap();
        assert_eq!(stats.percentage, 100.0);
        assert_eq!(stats.percentage_upper, 100.0);
    }

    #[test]
    fn empty_distribution_fails() {
        let err = compute_rank(5, &CitationDistribution::new()).unwrap_err();
        assert!(matches!(err, RankError::EmptyDistribution));
    }
}
