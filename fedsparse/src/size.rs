//! # Size Estimation
//!
//! Serialized footprint of a (possibly sparse) vector. Vectors are treated as
//! 1-D sparse COO: every stored entry costs one 8-byte index plus the element
//! itself, and zeros cost nothing.

use crate::core::{Scalar, count_nonzero};

/// Bytes per stored index in the sparse coordinate encoding
pub const INDEX_WIDTH_BYTES: usize = 8;

/// Footprint of `x` in bytes under the sparse COO encoding
pub fn size_of<T: Scalar>(x: &[T]) -> usize {
    (INDEX_WIDTH_BYTES + T::WIDTH_BYTES) * count_nonzero(x)
}

/// Raw bit width of `x` stored densely
pub fn dense_bits<T: Scalar>(x: &[T]) -> usize {
    x.len() * T::WIDTH_BYTES * 8
}

/// Fraction of entries that are exactly zero
pub fn sparse_ratio<T: Scalar>(x: &[T]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    (x.len() - count_nonzero(x)) as f64 / x.len() as f64
}
