//! Citerank Runner: batch ranking, configuration, and report output.
//!
//! This crate builds on `citerank-core` to provide:
//! - TOML configuration for the ADS client and the partition strategy
//! - Library batch runs, sequential or parallel, fail-fast or isolated
//! - Progress reporting through a `RankProgress` trait
//! - Rank table CSV/JSON persistence with run fingerprints
//! - Summary statistics, a Markdown report with a text rank chart, and a
//!   LaTeX table
//! - Run artifacts (JSON, CSV, report) that later runs can reuse

pub mod artifacts;
pub mod batch;
pub mod config;
pub mod report;
pub mod summary;
pub mod table;

pub use artifacts::{
    load_library_artifacts, save_library_artifacts, write_report, ArtifactPaths, StoredTable,
};
pub use batch::{
    rank_papers, rank_papers_isolated, run_library, run_library_outcomes, BatchTally,
    LogProgress, NoProgress, PaperOutcome, RankProgress, RunOptions,
};
pub use config::{ConfigError, RankConfig};
pub use report::{
    escape_bibcode_latex, generate_latex_table, generate_report, render_rank_chart,
};
pub use summary::{summarize, RankSummary, SummaryError};
pub use table::{
    export_json, import_json, read_rank_csv, run_fingerprint, write_rank_csv, RankRow,
    RankTable, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn table_types_are_send_sync() {
        assert_send::<RankTable>();
        assert_sync::<RankTable>();
        assert_send::<RankSummary>();
        assert_sync::<RankSummary>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<RankConfig>();
        assert_sync::<RankConfig>();
    }

    #[test]
    fn outcomes_are_send() {
        assert_send::<PaperOutcome>();
        assert_send::<LogProgress>();
        assert_sync::<LogProgress>();
    }
}
