//! # fedsparse - Gradient Compression for Federated Learning
//!
//! Lossy compressors for model updates sent over constrained links.
//!
//! ## Features
//!
//! - **sparsify**: top-k, rand-k, unbiased rand-k, sparse ternary and baseline
//!   sparsifiers behind a common [`Compressor`] trait
//! - **size**: sparse-COO footprint estimation and sparsity metrics
//! - **quantize**: budgeted k-means at a fixed bit-depth and the adaptive
//!   bit-depth search ([`sparse_kmeans`])
//! - **scaling**: min-max scaling around quantization
//! - **update**: per-layer compression of a model update with bandwidth
//!   accounting
//! - **config**: TOML configuration
//!
//! All operations are synchronous and allocate their output; inputs are never
//! mutated except by [`UpdateCompressor::compress`], which rewrites the layers
//! it is handed. Random sparsifiers draw only from a caller-supplied generator.
//!
//! Elements are `f32` or `f64` (see [`Scalar`]); integer updates must be cast
//! to a float type before compression.

pub mod error;
pub use error::{FedSparseError, Result};

pub mod core;
pub use crate::core::prelude::*;

pub mod config;
pub use config::{CompressionConfig, CompressionStrategy, KMeansConfig};

pub mod size;
pub use size::{INDEX_WIDTH_BYTES, dense_bits, size_of, sparse_ratio};

pub mod sparsify;
pub use sparsify::*;

pub mod quantize;
pub use quantize::*;

pub mod scaling;
pub use scaling::MinMaxScaler;

pub mod update;
pub use update::*;

/// Prelude module with common re-exports
pub mod prelude {
    pub use crate::config::{CompressionConfig, CompressionStrategy, KMeansConfig};
    pub use crate::core::prelude::*;
    pub use crate::error::{FedSparseError, Result};
    pub use crate::quantize::*;
    pub use crate::scaling::MinMaxScaler;
    pub use crate::size::{INDEX_WIDTH_BYTES, dense_bits, size_of, sparse_ratio};
    pub use crate::sparsify::*;
    pub use crate::update::*;
}
