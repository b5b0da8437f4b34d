//! Cluster-mean updater

use crate::core::Scalar;
use crate::error::{FedSparseError, Result};

/// Recompute each centroid as the mean of its assigned elements
///
/// A centroid with no members decays to zero rather than keeping its old
/// value.
pub fn update_centroids<T: Scalar>(centroids: &[T], assignment: &[usize], data: &[T]) -> Result<Vec<T>> {
    if assignment.len() != data.len() {
        return Err(FedSparseError::length_mismatch(data.len(), assignment.len()));
    }

    let mut sums = vec![T::zero(); centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (&label, &value) in assignment.iter().zip(data) {
        if label >= centroids.len() {
            return Err(FedSparseError::ConstraintViolation(format!(
                "assignment {} out of range for {} centroids",
                label,
                centroids.len()
            )));
        }
        sums[label] = sums[label] + value;
        counts[label] += 1;
    }

    Ok(sums
        .into_iter()
        .zip(counts)
        .map(|(sum, n)| if n == 0 { T::zero() } else { sum / T::from_usize(n) })
        .collect())
}
