//! Rank table persistence: CSV and JSON.
//!
//! The CSV form is the report table with the columns
//! `Bibcode, Author, PublicationDate, Rank, Rank_upper, PaperNumber`.
//! The JSON form wraps the same rows with run metadata and carries a
//! `schema_version`; unknown newer versions are rejected on load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use citerank_core::{PaperRankResult, RankSettings, SubRange};
use serde::{Deserialize, Deserializer, Serialize};

use crate::batch::PaperOutcome;

/// Current schema version for persisted JSON tables.
pub const SCHEMA_VERSION: u32 = 1;

/// One row of the rank table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRow {
    #[serde(rename = "Bibcode")]
    pub bibcode: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "PublicationDate")]
    pub publication_date: String,
    /// Greater-or-equal percentage.
    #[serde(rename = "Rank")]
    pub rank: f64,
    /// Strictly-greater percentage.
    #[serde(rename = "Rank_upper")]
    pub rank_upper: f64,
    /// Refereed papers in the comparison month.
    #[serde(rename = "PaperNumber", deserialize_with = "whole_number")]
    pub paper_number: usize,
}

/// Accept `1999` or `1999.0`; reject fractions and negatives.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
        return Err(serde::de::Error::custom(format!(
            "expected a whole paper count, got {value}"
        )));
    }
    Ok(value as usize)
}

impl RankRow {
    pub fn midpoint(&self) -> f64 {
        (self.rank + self.rank_upper) / 2.0
    }
}

impl From<&PaperRankResult> for RankRow {
    fn from(r: &PaperRankResult) -> Self {
        Self {
            bibcode: r.bib_code.clone(),
            author: r.author.clone(),
            publication_date: r.pub_date.to_string(),
            rank: r.percentage,
            rank_upper: r.percentage_upper,
            paper_number: r.total_papers_month,
        }
    }
}

/// A paper whose month page hit the cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncationNote {
    pub bibcode: String,
    pub ranges: Vec<SubRange>,
}

/// A paper that could not be ranked in an isolated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureNote {
    pub bibcode: String,
    pub error: String,
}

/// Rows plus the metadata needed to reproduce and report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub run_id: String,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(default)]
    pub has_synthetic: bool,
    pub rows: Vec<RankRow>,
    #[serde(default)]
    pub truncated: Vec<TruncationNote>,
    #[serde(default)]
    pub failures: Vec<FailureNote>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RankTable {
    /// A bare table, e.g. one read back from CSV.
    pub fn from_rows(rows: Vec<RankRow>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            run_id: String::new(),
            collection_id: None,
            generated_at: None,
            catalog: None,
            has_synthetic: false,
            rows,
            truncated: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn from_results(
        collection_id: Option<&str>,
        settings: &RankSettings,
        results: &[PaperRankResult],
    ) -> Self {
        let bibcodes: Vec<&str> = results.iter().map(|r| r.bib_code.as_str()).collect();
        let mut table = Self::from_rows(results.iter().map(RankRow::from).collect());
        table.run_id = run_fingerprint(settings, &bibcodes);
        table.collection_id = collection_id.map(str::to_string);
        table.generated_at = Some(Utc::now());
        table.truncated = results
            .iter()
            .filter(|r| r.is_possibly_truncated())
            .map(|r| TruncationNote {
                bibcode: r.bib_code.clone(),
                ranges: r.truncated_ranges.clone(),
            })
            .collect();
        table
    }

    /// Successful outcomes become rows; failures become notes. Library order
    /// is kept in both lists.
    pub fn from_outcomes(
        collection_id: Option<&str>,
        settings: &RankSettings,
        outcomes: &[PaperOutcome],
    ) -> Self {
        let results: Vec<PaperRankResult> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().cloned())
            .collect();
        let mut table = Self::from_results(collection_id, settings, &results);
        let all_codes: Vec<&str> = outcomes.iter().map(|o| o.bib_code.as_str()).collect();
        table.run_id = run_fingerprint(settings, &all_codes);
        table.failures = outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|e| FailureNote {
                    bibcode: o.bib_code.clone(),
                    error: e.to_string(),
                })
            })
            .collect();
        table
    }

    pub fn with_catalog(mut self, name: &str, synthetic: bool) -> Self {
        self.catalog = Some(name.to_string());
        self.has_synthetic = synthetic;
        self
    }
}

/// Content hash of the partition strategy and the bibcodes ranked.
///
/// Two runs with the same bounds, page cap, filters, and bibcode sequence get
/// the same id.
pub fn run_fingerprint(settings: &RankSettings, bibcodes: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for b in settings.bounds.as_slice() {
        hasher.update(&b.to_le_bytes());
    }
    hasher.update(&settings.bounds.sentinel().to_le_bytes());
    hasher.update(&(settings.page_cap as u64).to_le_bytes());
    hasher.update(settings.collection.as_bytes());
    hasher.update(&[u8::from(settings.refereed)]);
    for code in bibcodes {
        hasher.update(code.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex()[..16].to_string()
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Render rows as CSV with the report column headers.
pub fn rank_csv_string(rows: &[RankRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if rows.is_empty() {
        wtr.write_record([
            "Bibcode",
            "Author",
            "PublicationDate",
            "Rank",
            "Rank_upper",
            "PaperNumber",
        ])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn write_rank_csv(path: &Path, rows: &[RankRow]) -> Result<()> {
    let csv = rank_csv_string(rows)?;
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write rank table {}", path.display()))
}

pub fn parse_rank_csv(content: &str) -> Result<Vec<RankRow>> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    rdr.deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("bad rank table row {}", i + 1)))
        .collect()
}

pub fn read_rank_csv(path: &Path) -> Result<Vec<RankRow>> {
    if !path.is_file() {
        bail!("no file named {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_rank_csv(&content)
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(table: &RankTable) -> Result<String> {
    serde_json::to_string_pretty(table).context("failed to serialize RankTable to JSON")
}

pub fn import_json(json: &str) -> Result<RankTable> {
    let table: RankTable =
        serde_json::from_str(json).context("failed to deserialize RankTable from JSON")?;
    if table.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            table.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(table)
}
