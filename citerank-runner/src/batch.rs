//! Library batch runs.
//!
//! Two policies for a failing paper:
//! - fail-fast (`run_library`): the first error aborts the batch
//! - isolated (`run_library_outcomes`): every paper gets its own outcome
//!
//! Either can run papers sequentially or across the rayon pool; output order
//! always follows library order.

use std::sync::atomic::{AtomicUsize, Ordering};

use citerank_core::rank::paper::resolve_library;
use citerank_core::{get_paper_rank, Catalog, PaperRankResult, RankError, RankSettings};
use rayon::prelude::*;

/// How a batch is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub parallel: bool,
    pub isolate_failures: bool,
}

/// Result for one bibcode in an isolated run.
#[derive(Debug)]
pub struct PaperOutcome {
    pub bib_code: String,
    pub result: Result<PaperRankResult, RankError>,
}

/// Per-batch counts. In a fail-fast run, papers after the failing one are
/// neither succeeded nor failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchTally {
    /// Papers never attempted.
    pub fn skipped(&self) -> usize {
        self.total.saturating_sub(self.succeeded + self.failed)
    }
}

#[derive(Default)]
struct Counters {
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn tally(&self, total: usize) -> BatchTally {
        BatchTally {
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total,
        }
    }
}

/// Progress callback for multi-paper runs.
pub trait RankProgress: Send + Sync {
    /// Called when starting to rank a paper.
    fn on_start(&self, bib_code: &str, index: usize, total: usize);

    /// Called when a paper finishes, successfully or not.
    fn on_complete(
        &self,
        bib_code: &str,
        index: usize,
        total: usize,
        result: &Result<PaperRankResult, RankError>,
    );

    /// Called when the whole batch is done.
    fn on_batch_complete(&self, tally: BatchTally);
}

/// Reports progress through `tracing`.
pub struct LogProgress;

impl RankProgress for LogProgress {
    fn on_start(&self, bib_code: &str, index: usize, total: usize) {
        tracing::info!("[{}/{}] ranking {bib_code}", index + 1, total);
    }

    fn on_complete(
        &self,
        bib_code: &str,
        _index: usize,
        _total: usize,
        result: &Result<PaperRankResult, RankError>,
    ) {
        match result {
            Ok(r) if r.is_possibly_truncated() => tracing::warn!(
                bib_code,
                percentage = r.percentage,
                truncated_ranges = r.truncated_ranges.len(),
                "ranked with possibly truncated distribution"
            ),
            Ok(r) => tracing::info!(bib_code, percentage = r.percentage, "ranked"),
            Err(e) => tracing::error!(bib_code, error = %e, "failed"),
        }
    }

    fn on_batch_complete(&self, tally: BatchTally) {
        let skipped = tally.skipped();
        if skipped > 0 {
            tracing::info!(
                "batch stopped: {}/{} succeeded, {} failed, {skipped} skipped",
                tally.succeeded,
                tally.total,
                tally.failed
            );
        } else {
            tracing::info!(
                "batch complete: {}/{} succeeded, {} failed",
                tally.succeeded,
                tally.total,
                tally.failed
            );
        }
    }
}

/// Progress sink that ignores every event.
pub struct NoProgress;

impl RankProgress for NoProgress {
    fn on_start(&self, _: &str, _: usize, _: usize) {}
    fn on_complete(&self, _: &str, _: usize, _: usize, _: &Result<PaperRankResult, RankError>) {}
    fn on_batch_complete(&self, _: BatchTally) {}
}

fn rank_one(
    catalog: &dyn Catalog,
    bib_code: &str,
    index: usize,
    total: usize,
    settings: &RankSettings,
    progress: &dyn RankProgress,
    counters: &Counters,
) -> Result<PaperRankResult, RankError> {
    progress.on_start(bib_code, index, total);
    let result = get_paper_rank(catalog, bib_code, settings);
    let counter = if result.is_ok() {
        &counters.succeeded
    } else {
        &counters.failed
    };
    counter.fetch_add(1, Ordering::Relaxed);
    progress.on_complete(bib_code, index, total, &result);
    result
}

/// Rank `bib_codes` in order, aborting on the first failure.
pub fn rank_papers(
    catalog: &dyn Catalog,
    bib_codes: &[String],
    settings: &RankSettings,
    parallel: bool,
    progress: &dyn RankProgress,
) -> Result<Vec<PaperRankResult>, RankError> {
    let total = bib_codes.len();
    let counters = Counters::default();
    let rank = |(i, code): (usize, &String)| {
        rank_one(catalog, code, i, total, settings, progress, &counters)
    };

    let results: Result<Vec<_>, _> = if parallel {
        bib_codes.par_iter().enumerate().map(rank).collect()
    } else {
        bib_codes.iter().enumerate().map(rank).collect()
    };

    progress.on_batch_complete(counters.tally(total));
    results
}

/// Rank `bib_codes` in order, keeping every per-paper outcome.
pub fn rank_papers_isolated(
    catalog: &dyn Catalog,
    bib_codes: &[String],
    settings: &RankSettings,
    parallel: bool,
    progress: &dyn RankProgress,
) -> Vec<PaperOutcome> {
    let total = bib_codes.len();
    let counters = Counters::default();
    let rank = |(i, code): (usize, &String)| PaperOutcome {
        bib_code: code.clone(),
        result: rank_one(catalog, code, i, total, settings, progress, &counters),
    };

    let outcomes: Vec<PaperOutcome> = if parallel {
        bib_codes.par_iter().enumerate().map(rank).collect()
    } else {
        bib_codes.iter().enumerate().map(rank).collect()
    };

    progress.on_batch_complete(counters.tally(total));
    outcomes
}

/// Resolve a library and rank every paper, aborting on the first failure.
pub fn run_library(
    catalog: &dyn Catalog,
    collection_id: &str,
    settings: &RankSettings,
    opts: RunOptions,
    progress: &dyn RankProgress,
) -> Result<Vec<PaperRankResult>, RankError> {
    let codes = resolve_library(catalog, collection_id, settings)?;
    rank_papers(catalog, &codes, settings, opts.parallel, progress)
}

/// Resolve a library and rank every paper, isolating per-paper failures.
///
/// Failing to resolve the library itself is still an error.
pub fn run_library_outcomes(
    catalog: &dyn Catalog,
    collection_id: &str,
    settings: &RankSettings,
    opts: RunOptions,
    progress: &dyn RankProgress,
) -> Result<Vec<PaperOutcome>, RankError> {
    let codes = resolve_library(catalog, collection_id, settings)?;
    Ok(rank_papers_isolated(
        catalog,
        &codes,
        settings,
        opts.parallel,
        progress,
    ))
}
