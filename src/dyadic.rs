//! Flat dyadic partial-sum index over rank space.
//!
//! The index keeps one accumulator per (level, dyadic interval) pair in a single
//! contiguous buffer addressed through [`ScaleGeometry`]. Inserting a weight at a
//! rank touches one bucket per level; summing the weights at ranks strictly below
//! a query rank reads at most one bucket per level.
//!
//! # Query rule
//!
//! Let `k = floor((r - 1) / 2^ℓ)`. When `k` is odd, the interval containing
//! `r - 1`'s prefix at level `ℓ` is a right child, and its left sibling (bucket
//! `k`) lies entirely below `r`. Summing those siblings over all levels is the
//! binary decomposition of `[1, r - 1]`, so each level is visited exactly once.
//!
//! # Example
//!
//! ```
//! use dyadsum::DyadicIndex;
//!
//! let mut index = DyadicIndex::new(8).unwrap();
//! index.update(3, 2.0).unwrap();
//! index.update(6, 5.0).unwrap();
//!
//! assert_eq!(index.query(3).unwrap(), 0.0); // strictly below 3
//! assert_eq!(index.query(4).unwrap(), 2.0);
//! assert_eq!(index.query(8).unwrap(), 7.0);
//! ```

#[cfg(not(test))]
use alloc::vec::Vec;

use crate::error::AggregateError;
use crate::geometry::{bucket_index, Rounding, ScaleGeometry};

/// Dyadic partial-sum index sized for ranks in `[1, n]`.
///
/// The bucket store starts zeroed and only ever accumulates; there is no
/// removal. One index serves exactly one aggregation pass.
#[derive(Clone, Debug)]
pub struct DyadicIndex {
    geometry: ScaleGeometry,
    /// `2^(L+1)` accumulators, level segments laid out back to back.
    buckets: Vec<f64>,
}

impl DyadicIndex {
    /// Create a zeroed index for `n` observations.
    ///
    /// Fails with [`AggregateError::InvalidSize`] for `n = 0` and
    /// [`AggregateError::Allocation`] if the store cannot be reserved.
    pub fn new(n: usize) -> Result<Self, AggregateError> {
        let geometry = ScaleGeometry::new(n).ok_or(AggregateError::InvalidSize { n })?;
        Self::with_geometry(geometry)
    }

    /// Create a zeroed index for an already computed geometry.
    pub fn with_geometry(geometry: ScaleGeometry) -> Result<Self, AggregateError> {
        let capacity = geometry.capacity();
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(capacity)
            .map_err(|_| AggregateError::Allocation { buckets: capacity })?;
        buckets.resize(capacity, 0.0);
        Ok(Self { geometry, buckets })
    }

    /// The geometry this index was built with.
    #[inline]
    pub fn geometry(&self) -> &ScaleGeometry {
        &self.geometry
    }

    /// Number of observations (maximum rank) the index accepts.
    #[inline]
    pub fn len(&self) -> usize {
        self.geometry.n()
    }

    /// Always `false`: an index covers at least one rank.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of dyadic levels `L = ceil(log2(n))`.
    #[inline]
    pub fn levels(&self) -> u32 {
        self.geometry.levels()
    }

    /// Raw bucket store, level segments back to back.
    #[inline]
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    /// Add `weight` at `rank` on every level.
    ///
    /// Fails with [`AggregateError::OutOfRange`] if `rank` is not in `[1, n]`;
    /// the store is left untouched in that case.
    pub fn update(&mut self, rank: usize, weight: f64) -> Result<(), AggregateError> {
        self.check_rank(rank)?;
        self.update_unchecked(rank, weight);
        Ok(())
    }

    /// Sum of all weights inserted at ranks strictly below `rank`.
    ///
    /// Fails with [`AggregateError::OutOfRange`] if `rank` is not in `[1, n]`.
    pub fn query(&self, rank: usize) -> Result<f64, AggregateError> {
        self.check_rank(rank)?;
        Ok(self.query_unchecked(rank))
    }

    /// [`update`](Self::update) for a rank the caller has already validated.
    #[inline]
    pub(crate) fn update_unchecked(&mut self, rank: usize, weight: f64) {
        debug_assert!(self.geometry.contains(rank));
        for level in 0..self.geometry.levels() {
            let k = bucket_index(rank, level, Rounding::CeilDiv);
            self.buckets[self.geometry.slot(k, level)] += weight;
        }
    }

    /// [`query`](Self::query) for a rank the caller has already validated.
    #[inline]
    pub(crate) fn query_unchecked(&self, rank: usize) -> f64 {
        debug_assert!(self.geometry.contains(rank));
        let mut sum = 0.0;
        for level in 0..self.geometry.levels() {
            let k = bucket_index(rank, level, Rounding::FloorDivMinusOne);
            if k & 1 == 1 {
                sum += self.buckets[self.geometry.slot(k, level)];
            }
        }
        sum
    }

    #[inline]
    fn check_rank(&self, rank: usize) -> Result<(), AggregateError> {
        if self.geometry.contains(rank) {
            Ok(())
        } else {
            Err(AggregateError::OutOfRange {
                index: None,
                rank,
                n: self.geometry.n(),
            })
        }
    }

    /// Returns the heap memory usage in bytes.
    pub fn heap_size(&self) -> usize {
        self.buckets.capacity() * core::mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sum of weights strictly below `rank`, straight from the inserted pairs.
    fn naive_below(inserted: &[(usize, f64)], rank: usize) -> f64 {
        inserted
            .iter()
            .filter(|&&(r, _)| r < rank)
            .map(|&(_, w)| w)
            .sum()
    }

    #[test]
    fn test_new_zeroed() {
        let index = DyadicIndex::new(10).unwrap();
        assert_eq!(index.levels(), 4);
        assert_eq!(index.buckets().len(), 32);
        assert!(index.buckets().iter().all(|&b| b == 0.0));
        for rank in 1..=10 {
            assert_eq!(index.query(rank).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_new_rejects_zero() {
        assert_eq!(
            DyadicIndex::new(0).unwrap_err(),
            AggregateError::InvalidSize { n: 0 }
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_oversized_store_reports_allocation_failure() {
        // 2^62 ranks need 2^63 buckets: addressable, but never allocatable.
        assert_eq!(
            DyadicIndex::new(1 << 62).unwrap_err(),
            AggregateError::Allocation { buckets: 1 << 63 }
        );
    }

    #[test]
    fn test_unaddressable_size_is_invalid() {
        assert_eq!(
            DyadicIndex::new(usize::MAX).unwrap_err(),
            AggregateError::InvalidSize { n: usize::MAX }
        );
    }

    #[test]
    fn test_single_rank_index() {
        let mut index = DyadicIndex::new(1).unwrap();
        assert_eq!(index.levels(), 0);
        index.update(1, 3.0).unwrap();
        assert_eq!(index.query(1).unwrap(), 0.0);
    }

    #[test]
    fn test_query_is_strict() {
        let mut index = DyadicIndex::new(8).unwrap();
        index.update(5, 1.0).unwrap();
        assert_eq!(index.query(5).unwrap(), 0.0);
        assert_eq!(index.query(6).unwrap(), 1.0);
    }

    #[test]
    fn test_duplicate_ranks_accumulate() {
        let mut index = DyadicIndex::new(4).unwrap();
        index.update(2, 1.5).unwrap();
        index.update(2, 2.5).unwrap();
        assert_eq!(index.query(2).unwrap(), 0.0);
        assert_eq!(index.query(3).unwrap(), 4.0);
    }

    #[test]
    fn test_update_touches_one_bucket_per_level() {
        let mut index = DyadicIndex::new(16).unwrap();
        index.update(7, 1.0).unwrap();
        let touched = index.buckets().iter().filter(|&&b| b != 0.0).count();
        assert_eq!(touched, index.levels() as usize);
    }

    #[test]
    fn test_matches_naive_every_prefix() {
        for n in [2usize, 3, 5, 7, 8, 13, 16, 31, 64, 100] {
            let mut index = DyadicIndex::new(n).unwrap();
            let mut inserted = Vec::new();
            // Deterministic scramble of 1..=n
            for step in 0..n {
                let rank = (step * 7 + 3) % n + 1;
                let weight = (step % 5) as f64 + 0.5;
                index.update(rank, weight).unwrap();
                inserted.push((rank, weight));

                for query in 1..=n {
                    assert_eq!(
                        index.query(query).unwrap(),
                        naive_below(&inserted, query),
                        "n={}, step={}, query={}",
                        n,
                        step,
                        query
                    );
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_rank() {
        let mut index = DyadicIndex::new(4).unwrap();
        assert_eq!(
            index.update(0, 1.0).unwrap_err(),
            AggregateError::OutOfRange {
                index: None,
                rank: 0,
                n: 4
            }
        );
        assert!(index.update(5, 1.0).is_err());
        assert!(index.query(5).is_err());
        // A rejected update leaves the store untouched
        assert!(index.buckets().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_heap_size() {
        let index = DyadicIndex::new(1000).unwrap();
        assert!(index.heap_size() >= 2048 * 8);
    }
}
