use citerank_runner::summary::HIGHLIGHT_THRESHOLD;
use citerank_runner::{summarize, RankRow};
use proptest::prelude::*;

fn arb_row() -> impl Strategy<Value = RankRow> {
    (0.0f64..=100.0, 0.0f64..=100.0).prop_map(|(a, b)| RankRow {
        bibcode: "2020TEST..000".into(),
        author: "Doe,J".into(),
        publication_date: "2020-01".into(),
        rank: a.max(b),
        rank_upper: a.min(b),
        paper_number: 100,
    })
}

proptest! {
    #[test]
    fn median_lies_between_best_and_worst(rows in prop::collection::vec(arb_row(), 1..40)) {
        let s = summarize(&rows).unwrap();
        let lo = rows[s.best].midpoint();
        let hi = rows[s.worst].midpoint();
        prop_assert!(lo <= s.median_midpoint && s.median_midpoint <= hi);
        prop_assert!(lo <= s.mean_midpoint + 1e-9 && s.mean_midpoint <= hi + 1e-9);
    }

    #[test]
    fn highlighted_matches_threshold(rows in prop::collection::vec(arb_row(), 1..40)) {
        let s = summarize(&rows).unwrap();
        let expected: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r.midpoint() < HIGHLIGHT_THRESHOLD)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(s.highlighted, expected);
    }
}
