//! Errors surfaced by the rank computation.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::domain::{BoundsError, PubMonthError, SubRange};

#[derive(Debug, Error)]
pub enum RankError {
    #[error("no document found for bibcode '{bib_code}'")]
    NotFound { bib_code: String },

    #[error("library '{collection_id}' not found")]
    LibraryNotFound { collection_id: String },

    #[error("catalog failure while {context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: CatalogError,
    },

    #[error("no refereed papers in the comparison month; percentile rank is undefined")]
    EmptyDistribution,

    #[error("invalid citation bounds: {0}")]
    InvalidBounds(#[from] BoundsError),

    #[error("bad publication date for '{bib_code}': {source}")]
    InvalidPubDate {
        bib_code: String,
        #[source]
        source: PubMonthError,
    },

    #[error("invalid rank settings: {0}")]
    InvalidSettings(String),
}

impl RankError {
    /// Wrap a catalog failure, keeping not-found cases distinct from transport
    /// failures.
    pub(crate) fn from_catalog(err: CatalogError, context: impl Into<String>) -> Self {
        match err {
            CatalogError::NotFound { bib_code } => RankError::NotFound { bib_code },
            CatalogError::LibraryNotFound { collection_id } => {
                RankError::LibraryNotFound { collection_id }
            }
            source => RankError::Transport {
                context: context.into(),
                source,
            },
        }
    }

    pub(crate) fn page_failed(month: &str, range: SubRange, err: CatalogError) -> Self {
        RankError::Transport {
            context: format!("fetching {month} citations {range}"),
            source: err,
        }
    }
}
