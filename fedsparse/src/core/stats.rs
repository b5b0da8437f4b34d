//! # Statistics Functions
//!
//! Reductions and index selection over flat gradient slices.

use std::cmp::Ordering;

use super::scalar::{Scalar, is_nonzero};
use crate::error::{FedSparseError, Result};

/// Total order on floats for partitioning; NaN compares equal
#[inline]
fn cmp_float<T: Scalar>(a: T, b: T) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Number of non-zero entries
pub fn count_nonzero<T: Scalar>(x: &[T]) -> usize {
    x.iter().filter(|&&v| is_nonzero(v)).count()
}

/// Mean squared error: ‖a − b‖² / len(a)
pub fn mse<T: Scalar>(a: &[T], b: &[T]) -> Result<T> {
    if a.len() != b.len() {
        return Err(FedSparseError::length_mismatch(a.len(), b.len()));
    }
    if a.is_empty() {
        return Ok(T::zero());
    }

    let sum_sq = a
        .iter()
        .zip(b)
        .fold(T::zero(), |acc, (&x, &y)| acc + (x - y) * (x - y));

    Ok(sum_sq / T::from_usize(a.len()))
}

/// Maximum value (not magnitude); `None` for an empty slice
pub fn max_value<T: Scalar>(x: &[T]) -> Option<T> {
    x.iter().copied().reduce(T::max)
}

/// Mean of |x_i| over the given indices
pub fn mean_magnitude<T: Scalar>(x: &[T], indices: &[usize]) -> T {
    if indices.is_empty() {
        return T::zero();
    }
    let total = indices.iter().fold(T::zero(), |acc, &i| acc + x[i].abs());
    total / T::from_usize(indices.len())
}

/// Indices of the `k` largest-magnitude entries, in partition order
///
/// Backed by `select_nth_unstable_by`, so the choice among equal magnitudes
/// is deterministic for a given input but otherwise unspecified.
pub fn largest_magnitude_indices<T: Scalar>(x: &[T], k: usize) -> Vec<usize> {
    let k = k.min(x.len());
    let mut idxs: Vec<usize> = (0..x.len()).collect();

    if k == 0 {
        return Vec::new();
    }
    if k < idxs.len() {
        idxs.select_nth_unstable_by(k - 1, |&a, &b| cmp_float(x[b].abs(), x[a].abs()));
        idxs.truncate(k);
    }

    idxs
}

/// The `k` candidates with the smallest `values[candidate]`
///
/// Returns fewer than `k` indices when there are fewer candidates.
pub fn smallest_by_value<T: Scalar>(values: &[T], mut candidates: Vec<usize>, k: usize) -> Vec<usize> {
    let k = k.min(candidates.len());

    if k == 0 {
        return Vec::new();
    }
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, |&a, &b| cmp_float(values[a], values[b]));
        candidates.truncate(k);
    }

    candidates
}
