//! Dyadic scale geometry.
//!
//! Rank space `[1, n]` is covered at every level `ℓ` by intervals of length `2^ℓ`.
//! The bucket store keeps one accumulator per (level, interval) pair in a single
//! flat array, with level `ℓ` occupying the segment that starts at
//! `segment_offset(L, ℓ)`.
//!
//! # Layout
//!
//! For `L = ceil(log2(n))` the segment sizes halve with every level:
//!
//! ```text
//! level 0: 2^L slots   offset 0
//! level 1: 2^(L-1)     offset 2^L
//! level 2: 2^(L-2)     offset 2^L + 2^(L-1)
//! ...
//! ```
//!
//! The whole store fits in `2^(L+1)` slots.
//!
//! # Bucket numbering
//!
//! Buckets are numbered from 1 within a level: bucket `k` at level `ℓ` covers
//! the ranks `((k - 1) * 2^ℓ, k * 2^ℓ]`. Both rounding modes of
//! [`bucket_index`] are derived from [`dyadic_interval`], so insertion and
//! lookup always agree on which bucket a rank belongs to.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use crate::error::AggregateError;

/// Number of dyadic levels needed to cover `n` ranks: `ceil(log2(n))`.
///
/// Returns `None` for `n = 0` or when `2^(L+1)` would overflow `usize`.
#[inline]
pub fn checked_level_count(n: usize) -> Option<u32> {
    if n == 0 {
        return None;
    }
    let levels = n.checked_next_power_of_two()?.trailing_zeros();
    // The store needs 2^(L+1) slots.
    if levels + 1 >= usize::BITS {
        return None;
    }
    Some(levels)
}

/// Number of dyadic levels needed to cover `n` ranks: `ceil(log2(n))`.
///
/// `n = 1` needs no levels at all.
///
/// # Panics
///
/// Panics if `n == 0` or `n` exceeds `usize::MAX / 4`; use
/// [`checked_level_count`] for untrusted sizes.
#[inline]
pub fn level_count(n: usize) -> u32 {
    match checked_level_count(n) {
        Some(levels) => levels,
        None => panic!("level_count: unsupported observation count {}", n),
    }
}

/// Start of the segment for `level` in a store built for `levels` levels.
///
/// Equals `Σ_{s=0}^{level-1} 2^(levels - s)`, i.e. `2^(levels+1) - 2^(levels+1-level)`.
/// Defined for `level <= levels` and `levels < usize::BITS - 1`, the bound
/// [`checked_level_count`] enforces.
#[inline]
pub fn segment_offset(levels: u32, level: u32) -> usize {
    debug_assert!(level <= levels, "level {} > levels {}", level, levels);
    debug_assert!(
        levels + 1 < usize::BITS,
        "levels {} overflows the store size",
        levels
    );
    (1usize << (levels + 1)) - (1usize << (levels + 1 - level))
}

/// 0-based index of the dyadic interval containing `rank` at `level`.
///
/// Interval `j` covers ranks `(j * 2^level, (j + 1) * 2^level]`.
#[inline]
pub fn dyadic_interval(rank: usize, level: u32) -> usize {
    debug_assert!(rank >= 1, "ranks are 1-based");
    (rank - 1) >> level
}

/// Rounding used when mapping a rank to a bucket number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rounding {
    /// `ceil(rank / 2^level)`: the 1-based bucket containing `rank`.
    CeilDiv,
    /// `floor((rank - 1) / 2^level)`: the 1-based bucket immediately to the
    /// left of the one containing `rank` (0 if there is none).
    FloorDivMinusOne,
}

/// Bucket number of `rank` at `level` under the given rounding.
#[inline]
pub fn bucket_index(rank: usize, level: u32, rounding: Rounding) -> usize {
    let interval = dyadic_interval(rank, level);
    match rounding {
        Rounding::CeilDiv => interval + 1,
        Rounding::FloorDivMinusOne => interval,
    }
}

/// Geometry of a bucket store sized for `n` observations.
///
/// Serializes as `{"n": ...}`; `levels` is always recomputed from `n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "GeometrySize", into = "GeometrySize")
)]
pub struct ScaleGeometry {
    /// Number of observations (ranks are in `[1, n]`).
    n: usize,
    /// `ceil(log2(n))`.
    levels: u32,
}

impl ScaleGeometry {
    /// Geometry for `n` observations, or `None` if `n` is zero or unaddressable.
    pub fn new(n: usize) -> Option<Self> {
        checked_level_count(n).map(|levels| Self { n, levels })
    }

    /// Number of observations this geometry was built for.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of dyadic levels `L`.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Number of slots in the flat bucket store: `2^(L+1)`.
    #[inline]
    pub fn capacity(&self) -> usize {
        1usize << (self.levels + 1)
    }

    /// Whether `rank` is a valid rank for this geometry.
    #[inline]
    pub fn contains(&self, rank: usize) -> bool {
        (1..=self.n).contains(&rank)
    }

    /// Flat store address of 1-based bucket `k` at `level`.
    #[inline]
    pub fn slot(&self, k: usize, level: u32) -> usize {
        debug_assert!(k >= 1, "bucket numbers are 1-based");
        k - 1 + segment_offset(self.levels, level)
    }
}

/// Serialized form of [`ScaleGeometry`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct GeometrySize {
    n: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<GeometrySize> for ScaleGeometry {
    type Error = AggregateError;

    fn try_from(size: GeometrySize) -> Result<Self, Self::Error> {
        Self::new(size.n).ok_or(AggregateError::InvalidSize { n: size.n })
    }
}

#[cfg(feature = "serde")]
impl From<ScaleGeometry> for GeometrySize {
    fn from(geometry: ScaleGeometry) -> Self {
        Self { n: geometry.n }
    }
}
