//! Citation-count partitioning.
//!
//! The remote search service caps every result page, so a month's population
//! is fetched in citation-count slices that each stay under the cap. The
//! slices come from an ordered bound sequence `[0, b1, ..., bn]`: every bound
//! opens a sub-range that ends one before the next bound, and the last one
//! runs up to a large finite sentinel.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bounds that keep a typical month of refereed astronomy papers under the cap.
pub const DEFAULT_CITATION_BOUNDS: [u32; 5] = [0, 1, 2, 4, 10];

/// Upper end used for the final, open-ended sub-range in wire queries.
pub const OPEN_END_SENTINEL: u32 = 100_000;

/// Maximum number of records the search service returns per page.
pub const DEFAULT_PAGE_CAP: usize = 2000;

/// An inclusive citation-count interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubRange {
    pub lo: u32,
    pub hi: u32,
}

impl SubRange {
    pub fn new(lo: u32, hi: u32) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, citations: u32) -> bool {
        self.lo <= citations && citations <= self.hi
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.lo, self.hi)
    }
}

/// Rejections for a malformed bound sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("citation bounds must contain at least one value")]
    Empty,

    #[error("citation bounds must start at 0 (got {first})")]
    MustStartAtZero { first: u32 },

    #[error("citation bounds must be strictly increasing: bound {index} is {next} after {prev}")]
    NotStrictlyIncreasing { index: usize, prev: u32, next: u32 },

    #[error("citation bound {bound} is not below the open-end sentinel {sentinel}")]
    AtOrAboveSentinel { bound: u32, sentinel: u32 },
}

/// A validated, strictly increasing bound sequence starting at zero.
///
/// The sub-ranges it produces are contiguous, non-overlapping, and together
/// cover `[0, sentinel]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds", into = "RawBounds")]
pub struct CitationBounds {
    bounds: Vec<u32>,
    sentinel: u32,
}

impl CitationBounds {
    /// Validate `bounds` against the default sentinel.
    pub fn new(bounds: Vec<u32>) -> Result<Self, BoundsError> {
        Self::with_sentinel(bounds, OPEN_END_SENTINEL)
    }

    pub fn with_sentinel(bounds: Vec<u32>, sentinel: u32) -> Result<Self, BoundsError> {
        let first = *bounds.first().ok_or(BoundsError::Empty)?;
        if first != 0 {
            return Err(BoundsError::MustStartAtZero { first });
        }
        for (i, pair) in bounds.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(BoundsError::NotStrictlyIncreasing {
                    index: i + 1,
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        if let Some(&last) = bounds.last() {
            if last >= sentinel {
                return Err(BoundsError::AtOrAboveSentinel {
                    bound: last,
                    sentinel,
                });
            }
        }
        Ok(Self { bounds, sentinel })
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.bounds
    }

    pub fn sentinel(&self) -> u32 {
        self.sentinel
    }

    /// Number of sub-ranges (one per bound).
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// The sub-ranges in bound order; the last one ends at the sentinel.
    pub fn sub_ranges(&self) -> Vec<SubRange> {
        self.bounds
            .iter()
            .enumerate()
            .map(|(i, &lo)| {
                let hi = match self.bounds.get(i + 1) {
                    Some(&next) => next - 1,
                    None => self.sentinel,
                };
                SubRange::new(lo, hi)
            })
            .collect()
    }
}

impl Default for CitationBounds {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_CITATION_BOUNDS.to_vec(),
            sentinel: OPEN_END_SENTINEL,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawBounds {
    bounds: Vec<u32>,
    #[serde(default = "default_sentinel")]
    sentinel: u32,
}

fn default_sentinel() -> u32 {
    OPEN_END_SENTINEL
}

impl TryFrom<RawBounds> for CitationBounds {
    type Error = BoundsError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::with_sentinel(raw.bounds, raw.sentinel)
    }
}

impl From<CitationBounds> for RawBounds {
    fn from(b: CitationBounds) -> Self {
        RawBounds {
            bounds: b.bounds,
            sentinel: b.sentinel,
        }
    }
}
