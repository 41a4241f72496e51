//! Aggregate statistics over a rank table.
//!
//! Each paper is placed at the midpoint of its `[Rank_upper, Rank]` interval.
//! Lower is better: a midpoint of 2 means only about 2% of the month's papers
//! are cited at least as often.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::RankRow;

/// Papers with a midpoint below this are highlighted.
pub const HIGHLIGHT_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("rank table has no rows")]
    EmptyTable,

    #[error("non-finite rank for {bibcode}")]
    NonFiniteRank { bibcode: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankSummary {
    pub papers: usize,
    pub median_midpoint: f64,
    pub mean_midpoint: f64,
    /// Row indices with a midpoint below [`HIGHLIGHT_THRESHOLD`], in table order.
    pub highlighted: Vec<usize>,
    /// Row index of the lowest midpoint (first on ties).
    pub best: usize,
    /// Row index of the highest midpoint (first on ties).
    pub worst: usize,
}

impl RankSummary {
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlighted.binary_search(&index).is_ok()
    }
}

pub fn summarize(rows: &[RankRow]) -> Result<RankSummary, SummaryError> {
    if rows.is_empty() {
        return Err(SummaryError::EmptyTable);
    }

    let mut midpoints = Vec::with_capacity(rows.len());
    for row in rows {
        let m = row.midpoint();
        if !m.is_finite() {
            return Err(SummaryError::NonFiniteRank {
                bibcode: row.bibcode.clone(),
            });
        }
        midpoints.push(m);
    }

    let mut best = 0;
    let mut worst = 0;
    for (i, &m) in midpoints.iter().enumerate() {
        if m < midpoints[best] {
            best = i;
        }
        if m > midpoints[worst] {
            worst = i;
        }
    }

    let highlighted = midpoints
        .iter()
        .enumerate()
        .filter(|&(_, &m)| m < HIGHLIGHT_THRESHOLD)
        .map(|(i, _)| i)
        .collect();

    let mean_midpoint = midpoints.iter().sum::<f64>() / midpoints.len() as f64;

    Ok(RankSummary {
        papers: rows.len(),
        median_midpoint: median(&mut midpoints),
        mean_midpoint,
        highlighted,
        best,
        worst,
    })
}

/// Median of a non-empty slice; even lengths average the two middle values.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, rank: f64, rank_upper: f64) -> RankRow {
        RankRow {
            bibcode: code.into(),
            author: "Doe,J".into(),
            publication_date: "2021-03".into(),
            rank,
            rank_upper,
            paper_number: 1500,
        }
    }

    #[test]
    fn empty_table_is_an_error() {
        assert_eq!(summarize(&[]), Err(SummaryError::EmptyTable));
    }

    #[test]
    fn median_of_odd_and_even_tables() {
        let rows = vec![row("a", 10.0, 8.0), row("b", 2.0, 1.0), row("c", 40.0, 30.0)];
        let s = summarize(&rows).unwrap();
        assert_eq!(s.median_midpoint, 9.0);
        assert_eq!(s.best, 1);
        assert_eq!(s.worst, 2);
        assert_eq!(s.highlighted, vec![1]);
        assert!(s.is_highlighted(1));
        assert!(!s.is_highlighted(0));

        let rows = vec![row("a", 10.0, 8.0), row("b", 2.0, 2.0)];
        let s = summarize(&rows).unwrap();
        assert_eq!(s.median_midpoint, 5.5);
        assert_eq!(s.mean_midpoint, 5.5);
    }

    #[test]
    fn threshold_is_exclusive() {
        let rows = vec![row("a", 5.0, 5.0), row("b", 5.5, 4.0)];
        let s = summarize(&rows).unwrap();
        assert_eq!(s.highlighted, vec![1]);
    }

    #[test]
    fn nan_rank_is_reported() {
        let rows = vec![row("a", 1.0, 1.0), row("bad", f64::NAN, 1.0)];
        assert_eq!(
            summarize(&rows),
            Err(SummaryError::NonFiniteRank {
                bibcode: "bad".into()
            })
        );
    }
}
