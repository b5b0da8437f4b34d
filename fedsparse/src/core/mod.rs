//! # Core Numeric Primitives
//!
//! Shared building blocks for the compressors:
//! - Scalar element abstraction over `f32` / `f64`
//! - Statistics (MSE, extrema, mean magnitude)
//! - Partition-based index selection

pub mod scalar;
pub mod stats;

pub use scalar::*;
pub use stats::*;

/// Prelude module for core exports
pub mod prelude {
    pub use crate::core::scalar::*;
    pub use crate::core::stats::*;
}
