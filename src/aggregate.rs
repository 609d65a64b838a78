//! Single-pass aggregation driver.
//!
//! For `i = 2..=n` the driver inserts observation `i - 1` into a fresh
//! [`DyadicIndex`] and then queries at rank `i`, so every query sees exactly the
//! observations processed before it. Total work is O(n log n).
//!
//! All input checks run before the bucket store is allocated.

#[cfg(not(test))]
use alloc::{vec, vec::Vec};

use crate::dyadic::DyadicIndex;
use crate::error::AggregateError;
use crate::geometry::ScaleGeometry;
use crate::rank::ordinal_ranks;
use crate::Config;

/// Sum of `weight[j]` over all `j < i` with `rank[j] < rank[i]`, for every `i`.
///
/// `rank` must hold `n` values in `[1, n]` and `weight` must hold `n` values.
/// `out[0]` is always `0.0`.
///
/// # Errors
///
/// - [`AggregateError::InvalidSize`] if `n == 0`
/// - [`AggregateError::LengthMismatch`] if either slice is not of length `n`
/// - [`AggregateError::OutOfRange`] for the first rank outside `[1, n]`
/// - [`AggregateError::Allocation`] if the bucket store cannot be allocated
///
/// # Example
///
/// ```
/// use dyadsum::aggregate;
///
/// assert_eq!(aggregate(2, &[1, 2], &[5.0, 0.0]).unwrap(), vec![0.0, 5.0]);
/// assert_eq!(aggregate(2, &[2, 1], &[5.0, 0.0]).unwrap(), vec![0.0, 0.0]);
/// ```
pub fn aggregate(n: usize, rank: &[usize], weight: &[f64]) -> Result<Vec<f64>, AggregateError> {
    let geometry = validate(n, rank, weight).map_err(|err| {
        #[cfg(feature = "tracing")]
        tracing::warn!(%err, "rejected dyadic aggregation input");
        err
    })?;

    let mut out = vec![0.0; n];

    if n == 1 {
        return Ok(out);
    }

    let mut index = DyadicIndex::with_geometry(geometry)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        n,
        levels = geometry.levels(),
        buckets = geometry.capacity(),
        "dyadic aggregation pass"
    );

    for i in 1..n {
        index.update_unchecked(rank[i - 1], weight[i - 1]);
        out[i] = index.query_unchecked(rank[i]);
    }

    Ok(out)
}

/// [`aggregate`] with `n` taken from `rank.len()`.
pub fn aggregate_ranks(rank: &[usize], weight: &[f64]) -> Result<Vec<f64>, AggregateError> {
    aggregate(rank.len(), rank, weight)
}

/// Rank `values` with the configured tie policy, then [`aggregate`].
///
/// # Example
///
/// ```
/// use dyadsum::{aggregate_by_values, Config, TiePolicy};
///
/// let values = [2.0, 2.0, 1.0];
/// let weight = [1.0, 1.0, 1.0];
///
/// let first = aggregate_by_values(&values, &weight, &Config::default()).unwrap();
/// assert_eq!(first, vec![0.0, 1.0, 0.0]);
///
/// let last = Config::default().with_tie_policy(TiePolicy::Last);
/// assert_eq!(aggregate_by_values(&values, &weight, &last).unwrap(), vec![0.0, 0.0, 0.0]);
/// ```
pub fn aggregate_by_values(
    values: &[f64],
    weight: &[f64],
    config: &Config,
) -> Result<Vec<f64>, AggregateError> {
    if values.len() != weight.len() {
        return Err(AggregateError::LengthMismatch {
            n: values.len(),
            ranks: values.len(),
            weights: weight.len(),
        });
    }
    let rank = ordinal_ranks(values, config.tie_policy);
    aggregate(values.len(), &rank, weight)
}

fn validate(n: usize, rank: &[usize], weight: &[f64]) -> Result<ScaleGeometry, AggregateError> {
    let geometry = ScaleGeometry::new(n).ok_or(AggregateError::InvalidSize { n })?;

    if rank.len() != n || weight.len() != n {
        return Err(AggregateError::LengthMismatch {
            n,
            ranks: rank.len(),
            weights: weight.len(),
        });
    }

    if let Some((index, &r)) = rank.iter().enumerate().find(|&(_, &r)| !geometry.contains(r)) {
        return Err(AggregateError::OutOfRange {
            index: Some(index),
            rank: r,
            n,
        });
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::aggregate_naive;
    use crate::TiePolicy;

    #[test]
    fn test_single_observation() {
        assert_eq!(aggregate(1, &[1], &[42.0]).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_two_observations() {
        assert_eq!(aggregate(2, &[1, 2], &[5.0, 0.0]).unwrap(), vec![0.0, 5.0]);
        assert_eq!(aggregate(2, &[2, 1], &[5.0, 0.0]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_increasing_ranks_are_prefix_sums() {
        let n = 9;
        let rank: Vec<usize> = (1..=n).collect();
        let weight: Vec<f64> = (1..=n).map(|w| w as f64).collect();
        let out = aggregate(n, &rank, &weight).unwrap();
        let mut running = 0.0;
        for i in 0..n {
            assert_eq!(out[i], running, "i={}", i);
            running += weight[i];
        }
    }

    #[test]
    fn test_decreasing_ranks_are_zero() {
        let n = 17;
        let rank: Vec<usize> = (1..=n).rev().collect();
        let out = aggregate(n, &rank, &vec![1.0; n]).unwrap();
        assert!(out.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_matches_naive_with_duplicates() {
        let n = 37;
        let rank: Vec<usize> = (0..n).map(|i| (i * i + 3) % n + 1).collect();
        let weight: Vec<f64> = (0..n).map(|i| (i % 7) as f64 - 3.0).collect();
        assert_eq!(
            aggregate(n, &rank, &weight).unwrap(),
            aggregate_naive(&rank, &weight)
        );
    }

    #[test]
    fn test_invalid_size() {
        assert_eq!(
            aggregate(0, &[], &[]).unwrap_err(),
            AggregateError::InvalidSize { n: 0 }
        );
    }

    #[test]
    fn test_unaddressable_size_is_invalid() {
        assert_eq!(
            aggregate(usize::MAX, &[1], &[1.0]).unwrap_err(),
            AggregateError::InvalidSize { n: usize::MAX }
        );
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            aggregate(3, &[1, 2, 3], &[1.0, 2.0]).unwrap_err(),
            AggregateError::LengthMismatch {
                n: 3,
                ranks: 3,
                weights: 2
            }
        );
        assert_eq!(
            aggregate(2, &[1, 2, 3], &[1.0, 2.0, 3.0]).unwrap_err(),
            AggregateError::LengthMismatch {
                n: 2,
                ranks: 3,
                weights: 3
            }
        );
    }

    #[test]
    fn test_out_of_range_reports_first_offender() {
        assert_eq!(
            aggregate(4, &[1, 5, 0, 2], &[1.0; 4]).unwrap_err(),
            AggregateError::OutOfRange {
                index: Some(1),
                rank: 5,
                n: 4
            }
        );
        assert_eq!(
            aggregate(1, &[2], &[1.0]).unwrap_err(),
            AggregateError::OutOfRange {
                index: Some(0),
                rank: 2,
                n: 1
            }
        );
    }

    #[test]
    fn test_aggregate_ranks_infers_n() {
        assert_eq!(
            aggregate_ranks(&[3, 1, 2], &[1.0, 2.0, 4.0]).unwrap(),
            vec![0.0, 0.0, 2.0]
        );
        assert!(aggregate_ranks(&[], &[]).is_err());
    }

    #[test]
    fn test_by_values_length_mismatch() {
        let err = aggregate_by_values(&[1.0, 2.0], &[1.0], &Config::default()).unwrap_err();
        assert_eq!(
            err,
            AggregateError::LengthMismatch {
                n: 2,
                ranks: 2,
                weights: 1
            }
        );
    }

    #[test]
    fn test_by_values_matches_rank_path() {
        let values = [0.3, -1.2, 4.4, 0.3, 2.0, -7.5];
        let weight = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let config = Config::default().with_tie_policy(TiePolicy::Last);
        let rank = ordinal_ranks(&values, TiePolicy::Last);
        assert_eq!(
            aggregate_by_values(&values, &weight, &config).unwrap(),
            aggregate(values.len(), &rank, &weight).unwrap()
        );
    }
}
