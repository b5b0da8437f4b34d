//! # Scalar Elements
//!
//! Element type accepted by every compressor. Gradients arrive as flat
//! slices of `f32` or `f64`; the compressed output keeps the same type.
//!
//! Integer element types are not supported: the quantizer and the rescaling
//! sparsifiers need division and means. Cast integer gradients first:
//!
//! ```
//! use fedsparse::prelude::*;
//!
//! let update: Vec<i32> = vec![28, 39, -56, -48, 11];
//! let x: Vec<f32> = update.iter().map(|&v| v as f32).collect();
//! let cx = top_k(&x, 2).unwrap();
//! assert_eq!(cx, vec![0.0, 0.0, -56.0, -48.0, 0.0]);
//! assert_eq!(count_nonzero(&cx), 2);
//! ```

use num_traits::{Float, NumCast};
use std::fmt::Debug;

/// Floating-point element of a gradient vector
pub trait Scalar: Float + Debug + Send + Sync + 'static {
    /// Width of one element in bytes, used by the size estimator
    const WIDTH_BYTES: usize = std::mem::size_of::<Self>();

    /// Lossy conversion from `usize` (counts, lengths)
    #[inline]
    fn from_usize(n: usize) -> Self {
        <Self as NumCast>::from(n).unwrap_or_else(Self::infinity)
    }

    /// Lossy conversion from `f64` (constants, tolerances)
    #[inline]
    fn from_f64(v: f64) -> Self {
        <Self as NumCast>::from(v).unwrap_or_else(Self::nan)
    }

    /// Widening to `f64` for reporting
    #[inline]
    fn to_f64_lossy(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl Scalar for f32 {}
impl Scalar for f64 {}

/// `true` for entries the sparse encoding has to store
#[inline]
pub fn is_nonzero<T: Scalar>(v: T) -> bool {
    v != T::zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width() {
        assert_eq!(<f32 as Scalar>::WIDTH_BYTES, 4);
        assert_eq!(<f64 as Scalar>::WIDTH_BYTES, 8);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(f32::from_usize(10), 10.0);
        assert_eq!(f64::from_f64(0.25), 0.25);
        assert_eq!(3.5f32.to_f64_lossy(), 3.5);
    }

    #[test]
    fn test_is_nonzero() {
        assert!(!is_nonzero(0.0f64));
        assert!(!is_nonzero(-0.0f64));
        assert!(is_nonzero(1e-30f64));
    }
}
