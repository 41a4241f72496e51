//! Single-paper and library orchestration.

use crate::catalog::Catalog;
use crate::domain::{PaperRankResult, TargetPaper};
use crate::error::RankError;

use super::builder::build_distribution;
use super::calculator::compute_rank;
use super::RankSettings;

/// Resolve a paper by bibcode and rank it against its publication month.
pub fn get_paper_rank(
    catalog: &dyn Catalog,
    bib_code: &str,
    settings: &RankSettings,
) -> Result<PaperRankResult, RankError> {
    let target = resolve_target(catalog, bib_code)?;

    tracing::info!(
        bib_code,
        month = %target.pub_month,
        citations = target.citation_count,
        author = %target.first_author,
        "resolved target paper"
    );
    if target.pub_month.is_year_only() {
        tracing::warn!(
            bib_code,
            month = %target.pub_month,
            "publication date has no month; ranking against other year-only records"
        );
    }

    let build = build_distribution(catalog, &target.pub_month, settings)?;
    let stats = compute_rank(target.citation_count, &build.distribution).map_err(|e| {
        tracing::error!(bib_code, month = %target.pub_month, "no refereed papers found for month");
        e
    })?;

    tracing::info!(
        bib_code,
        total_papers_month = stats.total,
        percentage = stats.percentage,
        percentage_upper = stats.percentage_upper,
        "ranked paper"
    );

    Ok(PaperRankResult {
        bib_code: target.bib_code,
        citation_count: target.citation_count,
        greater_citations: stats.greater_citations,
        total_papers_month: stats.total,
        percentage: stats.percentage,
        percentage_upper: stats.percentage_upper,
        author: target.first_author,
        pub_date: target.pub_month,
        truncated_ranges: build.truncated,
    })
}

/// Look up a bibcode and turn its record into a `TargetPaper`.
pub fn resolve_target(catalog: &dyn Catalog, bib_code: &str) -> Result<TargetPaper, RankError> {
    let doc = catalog
        .lookup_document(bib_code)
        .map_err(|e| RankError::from_catalog(e, format!("looking up {bib_code}")))?;
    TargetPaper::from_document(bib_code, &doc).map_err(|source| RankError::InvalidPubDate {
        bib_code: bib_code.to_string(),
        source,
    })
}

/// Ordered bibcodes of a library, duplicates kept.
pub fn resolve_library(
    catalog: &dyn Catalog,
    collection_id: &str,
    settings: &RankSettings,
) -> Result<Vec<String>, RankError> {
    let codes = catalog
        .resolve_bib_codes(collection_id, settings.library_rows)
        .map_err(|e| RankError::from_catalog(e, format!("resolving library {collection_id}")))?;
    tracing::info!(collection_id, papers = codes.len(), "resolved library");
    Ok(codes)
}

/// Rank every paper of a library in library order.
///
/// The first failing paper aborts the batch; no partial results are returned.
pub fn get_library_ranks(
    catalog: &dyn Catalog,
    collection_id: &str,
    settings: &RankSettings,
) -> Result<Vec<PaperRankResult>, RankError> {
    resolve_library(catalog, collection_id, settings)?
        .iter()
        .map(|code| get_paper_rank(catalog, code, settings))
        .collect()
}
