//! # Dyadsum
//!
//! O(n log n) dyadic partial sums over rank space.
//!
//! For a sequence of ranked, weighted observations this crate computes, for every
//! observation `i`, the total weight of all *earlier* observations with a *smaller*
//! rank. This running aggregate is the inner kernel of the fast distance covariance
//! algorithm (Huo & Székely, 2016); a direct computation is O(n²).
//!
//! ## Module Organization
//!
//! - [`geometry`] - Dyadic level count, segment offsets and bucket arithmetic
//! - [`dyadic`] - Flat dyadic partial-sum index with `update` and `query`
//! - [`aggregate`] - The single-pass driver interleaving updates and queries
//! - [`rank`] - Ordinal rank construction with an explicit tie policy
//! - [`reference`] - O(n²) brute-force oracle
//!
//! ## Quick Start
//!
//! ```
//! use dyadsum::aggregate;
//!
//! let rank = [3, 1, 4, 2];
//! let weight = [1.0, 10.0, 100.0, 1000.0];
//!
//! let out = aggregate(4, &rank, &weight).unwrap();
//! // out[i] = sum of weight[j] for j < i with rank[j] < rank[i]
//! assert_eq!(out, vec![0.0, 0.0, 11.0, 10.0]);
//! ```
//!
//! ## Features
//!
//! - `std` (default) - `std::error::Error` support
//! - `serde` - Enable serialization/deserialization support
//! - `tracing` - Structured `tracing` events for driver passes and rejected inputs
//! - `cli` - The `dyadsum` command line tool

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// =============================================================================
// Core modules
// =============================================================================

/// Dyadic scale geometry: level counts, segment offsets, bucket indices.
pub mod geometry;

/// Flat dyadic partial-sum index.
pub mod dyadic;

/// Single-pass aggregation driver.
pub mod aggregate;

/// Error types.
pub mod error;

// =============================================================================
// Supporting modules
// =============================================================================

/// Ordinal ranks from real-valued covariates.
pub mod rank;

/// Brute-force reference implementation.
pub mod reference;

// =============================================================================
// Public re-exports
// =============================================================================

pub use aggregate::{aggregate, aggregate_by_values, aggregate_ranks};
pub use dyadic::DyadicIndex;
pub use error::AggregateError;
pub use geometry::{bucket_index, level_count, segment_offset, Rounding, ScaleGeometry};
pub use rank::{ordinal_ranks, TiePolicy};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for value-based aggregation.
///
/// The rank-based entry points ([`aggregate`], [`DyadicIndex`]) take no
/// configuration; this only matters when ranks are derived from raw values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// How tied values are ordered when ranks are built (default: `First`)
    pub tie_policy: TiePolicy,
}

impl Config {
    /// Set the tie policy used for rank construction.
    pub fn with_tie_policy(mut self, tie_policy: TiePolicy) -> Self {
        self.tie_policy = tie_policy;
        self
    }
}
