//! citerank core: citation distributions, percentile ranks, catalog providers.
//!
//! This crate ranks a paper against every refereed astronomy paper published
//! in the same month:
//! - Domain types (citation bounds, distributions, target papers, results)
//! - Distribution builder that fetches a month in citation sub-ranges to stay
//!   under the catalog page cap, flagging pages that may be truncated
//! - Rank calculator producing the `>=` and `>` percentages
//! - `Catalog` trait with ADS, in-memory and synthetic implementations

pub mod catalog;
pub mod domain;
pub mod error;
pub mod rank;

pub use catalog::{Catalog, CatalogError};
pub use domain::{CitationBounds, CitationDistribution, PaperRankResult, PubMonth, SubRange};
pub use error::RankError;
pub use rank::{
    build_distribution, compute_rank, get_library_ranks, get_paper_rank, DistributionBuild,
    RankSettings,
};
