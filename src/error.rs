//! Error types for dyadic aggregation.
//!
//! Every variant is a caller contract violation or an allocation failure.
//! Input errors are detected before the bucket store is touched, so an `Err`
//! never comes with partial output.

use core::fmt;

/// Errors returned by [`DyadicIndex`](crate::DyadicIndex) and the aggregation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    /// The observation count is zero (or too large to address).
    InvalidSize { n: usize },
    /// A rank lies outside `[1, n]`.
    ///
    /// `index` is the 0-based position of the offending rank in the input,
    /// or `None` when the rank was passed directly to the index.
    OutOfRange {
        index: Option<usize>,
        rank: usize,
        n: usize,
    },
    /// The rank and weight sequences disagree in length with each other or with `n`.
    LengthMismatch {
        n: usize,
        ranks: usize,
        weights: usize,
    },
    /// The bucket store could not be allocated.
    Allocation { buckets: usize },
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { n } => {
                write!(f, "invalid observation count {} (must be at least 1)", n)
            }
            Self::OutOfRange {
                index: Some(index),
                rank,
                n,
            } => write!(
                f,
                "rank {} at index {} is outside the valid range [1, {}]",
                rank, index, n
            ),
            Self::OutOfRange {
                index: None,
                rank,
                n,
            } => write!(f, "rank {} is outside the valid range [1, {}]", rank, n),
            Self::LengthMismatch { n, ranks, weights } => write!(
                f,
                "length mismatch: n = {}, but {} ranks and {} weights were given",
                n, ranks, weights
            ),
            Self::Allocation { buckets } => {
                write!(f, "failed to allocate a bucket store of {} entries", buckets)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AggregateError {}
