//! Percentile rank computation.
//!
//! Three stages, each usable on its own:
//! - `build_distribution()`: fetch a month's citation counts sub-range by
//!   sub-range, flagging pages that hit the cap
//! - `compute_rank()`: derive the two percentages for a target count
//! - `get_paper_rank()` / `get_library_ranks()`: resolve papers through a
//!   `Catalog` and run the two stages above

pub mod builder;
pub mod calculator;
pub mod paper;

use serde::{Deserialize, Serialize};

use crate::catalog::ASTRONOMY_COLLECTION;
use crate::domain::{CitationBounds, DEFAULT_PAGE_CAP};
use crate::error::RankError;

pub use builder::{build_distribution, DistributionBuild};
pub use calculator::compute_rank;
pub use paper::{get_library_ranks, get_paper_rank};

/// Default number of bibcodes requested from a library.
pub const DEFAULT_LIBRARY_ROWS: usize = 1000;

/// Partition strategy and filters for one rank computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankSettings {
    pub bounds: CitationBounds,
    /// A page of exactly this size marks its sub-range as possibly truncated.
    pub page_cap: usize,
    pub collection: String,
    pub refereed: bool,
    /// Page cap for library resolution.
    pub library_rows: usize,
}

impl RankSettings {
    pub fn new(bounds: CitationBounds, page_cap: usize) -> Result<Self, RankError> {
        let settings = Self {
            bounds,
            page_cap,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), RankError> {
        if self.page_cap == 0 {
            return Err(RankError::InvalidSettings("page_cap must be > 0".into()));
        }
        if self.library_rows == 0 {
            return Err(RankError::InvalidSettings("library_rows must be > 0".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RankError::InvalidSettings("collection must not be empty".into()));
        }
        Ok(())
    }
}

impl Default for RankSettings {
    fn default() -> Self {
        Self {
            bounds: CitationBounds::default(),
            page_cap: DEFAULT_PAGE_CAP,
            collection: ASTRONOMY_COLLECTION.to_string(),
            refereed: true,
            library_rows: DEFAULT_LIBRARY_ROWS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_limits() {
        let s = RankSettings::default();
        assert_eq!(s.page_cap, 2000);
        assert_eq!(s.bounds.as_slice(), &[0, 1, 2, 4, 10]);
        assert_eq!(s.collection, "astronomy");
        assert!(s.refereed);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn zero_page_cap_rejected() {
        let err = RankSettings::new(CitationBounds::default(), 0).unwrap_err();
        assert!(matches!(err, RankError::InvalidSettings(_)));
    }
}
