//! Ordinal ranks from real-valued covariates.
//!
//! The dyadic driver compares ranks strictly, so ties in the underlying values
//! must be resolved before aggregation. [`ordinal_ranks`] assigns every value a
//! distinct rank in `[1, n]`, breaking ties by input position.

#[cfg(not(test))]
use alloc::{vec, vec::Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How tied values are ordered relative to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TiePolicy {
    /// Earlier positions get smaller ranks (stable sort order).
    ///
    /// A tied observation processed earlier counts as "below" a later one.
    #[default]
    First,
    /// Earlier positions get larger ranks.
    ///
    /// Tied observations never contribute to each other.
    Last,
}

/// Assign 1-based ordinal ranks to `values`.
///
/// Values are ordered with [`f64::total_cmp`], so `NaN`s sort after every
/// other value instead of poisoning the sort.
///
/// # Example
///
/// ```
/// use dyadsum::{ordinal_ranks, TiePolicy};
///
/// let values = [0.5, -1.0, 0.5, 3.0];
/// assert_eq!(ordinal_ranks(&values, TiePolicy::First), vec![2, 1, 3, 4]);
/// assert_eq!(ordinal_ranks(&values, TiePolicy::Last), vec![3, 1, 2, 4]);
/// ```
pub fn ordinal_ranks(values: &[f64], ties: TiePolicy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    match ties {
        TiePolicy::First => order.sort_by(|&a, &b| values[a].total_cmp(&values[b])),
        TiePolicy::Last => {
            order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(b.cmp(&a)))
        }
    }

    let mut ranks = vec![0usize; values.len()];
    for (position, &i) in order.iter().enumerate() {
        ranks[i] = position + 1;
    }
    ranks
}
