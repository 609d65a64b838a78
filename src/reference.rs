//! Brute-force reference for the dyadic aggregate.
//!
//! O(n²) and unvalidated. Kept public so tests, benchmarks and the CLI check
//! against one shared definition.

#[cfg(not(test))]
use alloc::vec::Vec;

/// `out[i]` = sum of `weight[j]` for all `j < i` with `rank[j] < rank[i]`.
///
/// Only the common prefix of `rank` and `weight` is used.
pub fn aggregate_naive(rank: &[usize], weight: &[f64]) -> Vec<f64> {
    let n = rank.len().min(weight.len());
    (0..n)
        .map(|i| {
            (0..i)
                .filter(|&j| rank[j] < rank[i])
                .map(|j| weight[j])
                .sum()
        })
        .collect()
}
