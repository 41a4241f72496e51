//! Domain types: citation bounds, distributions, papers, and rank results.

pub mod bounds;
pub mod distribution;
pub mod paper;
pub mod result;

pub use bounds::{
    BoundsError, CitationBounds, SubRange, DEFAULT_CITATION_BOUNDS, DEFAULT_PAGE_CAP,
    OPEN_END_SENTINEL,
};
pub use distribution::CitationDistribution;
pub use paper::{CitationRecord, DocumentRecord, PubMonth, PubMonthError, TargetPaper};
pub use result::{PaperRankResult, RankStats};
