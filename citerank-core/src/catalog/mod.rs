//! Catalog capability trait and structured error types.
//!
//! The `Catalog` trait abstracts over bibliographic sources (the ADS search
//! API, an in-memory fake, a seeded synthetic generator) so the rank
//! computation can be exercised without network access.

pub mod ads;
pub mod circuit_breaker;
pub mod memory;
pub mod rate_limit;
pub mod synthetic;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CitationRecord, DocumentRecord, PubMonth, SubRange};

pub use ads::{AdsCatalog, AdsSettings, Credential};
pub use circuit_breaker::CircuitBreaker;
pub use memory::InMemoryCatalog;
pub use rate_limit::RateLimitStatus;
pub use synthetic::SyntheticCatalog;

/// Collection filter used for the comparison population.
pub const ASTRONOMY_COLLECTION: &str = "astronomy";

/// Structured error types for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no document found for bibcode '{bib_code}'")]
    NotFound { bib_code: String },

    #[error("library '{collection_id}' not found")]
    LibraryNotFound { collection_id: String },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by catalog (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("hard stop: catalog has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("catalog error: {0}")]
    Other(String),
}

impl CatalogError {
    /// True for failures of the transport or the service rather than of the
    /// requested identifier.
    pub fn is_transport(&self) -> bool {
        !matches!(
            self,
            CatalogError::NotFound { .. } | CatalogError::LibraryNotFound { .. }
        )
    }
}

/// A range-bounded query for one month's refereed papers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthQuery {
    pub pub_month: PubMonth,
    pub range: SubRange,
    pub collection: String,
    pub refereed: bool,
    /// Maximum number of records to return.
    pub page_cap: usize,
}

impl MonthQuery {
    /// Solr query string for this month and citation range.
    pub fn query_string(&self) -> String {
        let month = self.pub_month.as_str();
        let mut q = format!("pubdate:[{month} TO {month}] AND collection:{}", self.collection);
        if self.refereed {
            q.push_str(" AND property:refereed");
        }
        q.push_str(&format!(
            " AND citation_count:[{} TO {}]",
            self.range.lo, self.range.hi
        ));
        q
    }
}

/// Trait for bibliographic catalogs.
///
/// Every method is a blocking call; implementations own their own timeouts
/// and surface them as errors rather than hanging.
pub trait Catalog: Send + Sync {
    /// Human-readable name of this catalog.
    fn name(&self) -> &str;

    /// Resolve a single document by bibcode.
    fn lookup_document(&self, bib_code: &str) -> Result<DocumentRecord, CatalogError>;

    /// Fetch at most `query.page_cap` records matching the month query.
    fn fetch_page(&self, query: &MonthQuery) -> Result<Vec<CitationRecord>, CatalogError>;

    /// Ordered bibcodes of a named collection (library), duplicates kept.
    fn resolve_bib_codes(
        &self,
        collection_id: &str,
        page_cap: usize,
    ) -> Result<Vec<String>, CatalogError>;

    /// Check if the catalog is currently accepting requests.
    fn is_available(&self) -> bool;
}
