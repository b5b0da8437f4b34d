//! # Budgeted K-Means Quantization
//!
//! Reduces a gradient to `2^b` representative values under a byte budget.
//! One centroid is pinned at zero and acts as a sparsifier; the budget caps
//! how many elements may map anywhere else.
//!
//! caller → [`sparse_kmeans`] → [`compress_b`] (per bit-depth) →
//! [`update_centroids`] (per iteration)

pub mod budgeted;
pub mod centroids;
pub mod search;

pub use budgeted::*;
pub use centroids::*;
pub use search::*;

/// Largest accepted bit-depth (65 536 centroids)
pub const MAX_BIT_DEPTH: u32 = 16;

/// Default distance: |x|²
#[inline]
pub fn squared_distance<T: crate::core::Scalar>(x: T) -> T {
    x * x
}

/// Alternative distance: |x|
#[inline]
pub fn absolute_distance<T: crate::core::Scalar>(x: T) -> T {
    x.abs()
}
