//! Library run artifacts in an output directory.
//!
//! A run with ranked papers writes `<stem>.json` (the full table with its
//! truncation and failure notes), `<stem>.csv` (the rank table), and
//! `<stem>.md` (the report). A run where nothing could be ranked writes only
//! the report, so a later run never mistakes an empty table for a finished
//! one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::report::generate_report;
use crate::summary::{summarize, RankSummary};
use crate::table::{export_json, import_json, read_rank_csv, write_rank_csv, RankTable};

/// File locations for one library run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub json: PathBuf,
    pub csv: PathBuf,
    pub report: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path, stem: &str) -> Self {
        Self {
            json: dir.join(format!("{stem}.json")),
            csv: dir.join(format!("{stem}.csv")),
            report: dir.join(format!("{stem}.md")),
        }
    }
}

/// A table loaded back from a previous run.
#[derive(Debug, Clone)]
pub struct StoredTable {
    pub table: RankTable,
    /// False when only the CSV was found, so truncation and failure notes
    /// are not known.
    pub complete: bool,
}

/// Write the run's artifacts and return its summary (`None` when no paper
/// was ranked).
pub fn save_library_artifacts(
    table: &RankTable,
    paths: &ArtifactPaths,
) -> Result<Option<RankSummary>> {
    let summary = if table.rows.is_empty() {
        for stale in [&paths.json, &paths.csv] {
            if stale.is_file() {
                std::fs::remove_file(stale)
                    .with_context(|| format!("failed to remove {}", stale.display()))?;
            }
        }
        warn!(failures = table.failures.len(), "no papers ranked; writing report only");
        None
    } else {
        let json = export_json(table)?;
        std::fs::write(&paths.json, json)
            .with_context(|| format!("failed to write {}", paths.json.display()))?;
        write_rank_csv(&paths.csv, &table.rows)?;
        info!(path = %paths.csv.display(), rows = table.rows.len(), "wrote rank table");
        Some(summarize(&table.rows)?)
    };

    write_report(table, summary.as_ref(), &paths.report)?;
    Ok(summary)
}

pub fn write_report(table: &RankTable, summary: Option<&RankSummary>, path: &Path) -> Result<()> {
    std::fs::write(path, generate_report(table, summary))
        .with_context(|| format!("failed to write report {}", path.display()))?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

/// Load a previous run's table for `collection_id`, preferring the JSON.
///
/// Returns `None` when there is nothing reusable: no files, zero rows, or a
/// JSON table recorded for a different library.
pub fn load_library_artifacts(
    paths: &ArtifactPaths,
    collection_id: &str,
) -> Result<Option<StoredTable>> {
    if paths.json.is_file() {
        let json = std::fs::read_to_string(&paths.json)
            .with_context(|| format!("failed to read {}", paths.json.display()))?;
        let table = import_json(&json)
            .with_context(|| format!("cannot reuse {}", paths.json.display()))?;
        if let Some(stored_id) = table.collection_id.as_deref() {
            if stored_id != collection_id {
                warn!(
                    path = %paths.json.display(),
                    stored = stored_id,
                    "saved table belongs to another library; re-ranking"
                );
                return Ok(None);
            }
        }
        if table.rows.is_empty() {
            return Ok(None);
        }
        return Ok(Some(StoredTable {
            table,
            complete: true,
        }));
    }

    if paths.csv.is_file() {
        let rows = read_rank_csv(&paths.csv)?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut table = RankTable::from_rows(rows);
        table.collection_id = Some(collection_id.to_string());
        return Ok(Some(StoredTable {
            table,
            complete: false,
        }));
    }

    Ok(None)
}
