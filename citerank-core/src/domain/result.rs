//! Rank statistics and the per-paper result record.

use serde::{Deserialize, Serialize};

use super::bounds::SubRange;
use super::paper::PubMonth;

/// Percentile statistics for one target count against one distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankStats {
    /// Papers with citations >= target (the target itself included).
    pub greater_citations: usize,
    /// Papers with citations > target.
    pub strictly_greater: usize,
    pub total: usize,
    /// `100 * greater_citations / total`; lower is better.
    pub percentage: f64,
    /// `100 * strictly_greater / total`; the optimistic bound.
    pub percentage_upper: f64,
}

/// Where a paper stands among refereed papers published in the same month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRankResult {
    pub bib_code: String,
    pub citation_count: u32,
    pub greater_citations: usize,
    pub total_papers_month: usize,
    pub percentage: f64,
    pub percentage_upper: f64,
    pub author: String,
    pub pub_date: PubMonth,
    /// Sub-ranges whose page came back full; when non-empty the month total is
    /// a lower bound and both percentages may look better than they are.
    #[serde(default)]
    pub truncated_ranges: Vec<SubRange>,
}

impl PaperRankResult {
    pub fn is_possibly_truncated(&self) -> bool {
        !self.truncated_ranges.is_empty()
    }

    /// Centre of the `[percentage_upper, percentage]` interval.
    pub fn midpoint(&self) -> f64 {
        (self.percentage + self.percentage_upper) / 2.0
    }
}
