//! # Model-Update Compression
//!
//! Applies a configured compressor to selected layers of a flattened model
//! update and accounts for the bandwidth it saves. This is the surface a
//! federated client calls between local training and upload.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{CompressionConfig, CompressionStrategy};
use crate::core::{Scalar, count_nonzero, mse};
use crate::error::{FedSparseError, Result};
use crate::quantize::sparse_kmeans;
use crate::scaling::MinMaxScaler;
use crate::size::{dense_bits, size_of, sparse_ratio};
use crate::sparsify::{baseline, rand_k, sparse_ternary, top_k, unbiased_rand_k};

/// Entries kept for a given space saving: `ceil((1 - space_savings) * len)`
pub fn retain_count_for(len: usize, space_savings: f64) -> usize {
    let keep = ((1.0 - space_savings) * len as f64).ceil();
    (keep.max(0.0) as usize).min(len)
}

/// Byte budget for a layer: `floor(budget_fraction * dense_bits)`, at least 1
pub fn budget_for<T: Scalar>(x: &[T], budget_fraction: f64) -> usize {
    let budget = (budget_fraction * dense_bits(x) as f64).floor();
    (budget as usize).max(1)
}

/// Per-layer accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerReport {
    pub index: usize,
    pub len: usize,
    pub before_nonzeros: usize,
    pub after_nonzeros: usize,
    pub before_bytes: usize,
    pub after_bytes: usize,
    /// Fraction of zeros in the uncompressed layer
    pub sparsity: f64,
    /// Selected bit-depth (sparse k-means only)
    pub bit_depth: Option<u32>,
    /// Reconstruction error against the uncompressed layer
    pub mse: f64,
    /// Sparse k-means stayed over its cap
    pub over_budget: bool,
}

/// Accounting for a whole update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub method: String,
    pub layers: Vec<LayerReport>,
    pub before_nonzeros: usize,
    pub after_nonzeros: usize,
    pub before_bytes: usize,
    pub after_bytes: usize,
    /// Length-weighted mean of the per-layer input sparsity
    pub weighted_sparsity: f64,
    /// `after_bytes / before_bytes`; 0 when nothing was sent before
    pub compression_rate: f64,
    pub elapsed: Duration,
}

fn compression_rate(before_bytes: usize, after_bytes: usize) -> f64 {
    if before_bytes == 0 {
        0.0
    } else {
        after_bytes as f64 / before_bytes as f64
    }
}

impl UpdateReport {

    /// Any layer whose quantization stayed over budget
    pub fn over_budget_layers(&self) -> Vec<usize> {
        self.layers.iter().filter(|l| l.over_budget).map(|l| l.index).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Compresses model updates according to a [`CompressionConfig`]
///
/// Owns the generator used by the random sparsifiers, so results are
/// reproducible whenever the strategy pins a seed.
pub struct UpdateCompressor {
    config: CompressionConfig,
    rng: StdRng,
}

impl UpdateCompressor {
    pub fn new(config: CompressionConfig) -> Result<Self> {
        let rng = match config.strategy.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    /// Use a caller-provided generator instead of the configured seed
    pub fn with_rng(config: CompressionConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress the configured layers of `layers` in place
    pub fn compress<T: Scalar>(&mut self, layers: &mut [Vec<T>]) -> Result<UpdateReport> {
        let start = Instant::now();

        let indices: Vec<usize> = if self.config.layers_to_compress.is_empty() {
            (0..layers.len()).collect()
        } else {
            self.config.layers_to_compress.clone()
        };
        if let Some(&bad) = indices.iter().find(|&&i| i >= layers.len()) {
            return Err(FedSparseError::ConstraintViolation(format!(
                "layer {} out of range for update with {} layers",
                bad,
                layers.len()
            )));
        }

        let mut reports = Vec::with_capacity(indices.len());
        for index in indices {
            let report = self.compress_layer(index, &mut layers[index])?;
            debug!(
                layer = index,
                before = report.before_nonzeros,
                after = report.after_nonzeros,
                bit_depth = ?report.bit_depth,
                "layer compressed"
            );
            reports.push(report);
        }

        let total_len: usize = reports.iter().map(|l| l.len).sum();
        let weighted_sparsity = if total_len == 0 {
            0.0
        } else {
            reports.iter().map(|l| l.sparsity * l.len as f64).sum::<f64>() / total_len as f64
        };

        let before_bytes: usize = reports.iter().map(|l| l.before_bytes).sum();
        let after_bytes: usize = reports.iter().map(|l| l.after_bytes).sum();

        let report = UpdateReport {
            method: self.config.strategy.name().to_string(),
            before_nonzeros: reports.iter().map(|l| l.before_nonzeros).sum(),
            after_nonzeros: reports.iter().map(|l| l.after_nonzeros).sum(),
            before_bytes,
            after_bytes,
            layers: reports,
            weighted_sparsity,
            compression_rate: compression_rate(before_bytes, after_bytes),
            elapsed: start.elapsed(),
        };

        info!(
            method = %report.method,
            before_nonzeros = report.before_nonzeros,
            after_nonzeros = report.after_nonzeros,
            rate = report.compression_rate,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "update compressed"
        );

        Ok(report)
    }

    fn compress_layer<T: Scalar>(&mut self, index: usize, layer: &mut Vec<T>) -> Result<LayerReport> {
        let x: &[T] = layer.as_slice();
        let mut report = LayerReport {
            index,
            len: x.len(),
            before_nonzeros: count_nonzero(x),
            after_nonzeros: count_nonzero(x),
            before_bytes: size_of(x),
            after_bytes: size_of(x),
            sparsity: sparse_ratio(x),
            bit_depth: None,
            mse: 0.0,
            over_budget: false,
        };
        if x.is_empty() {
            return Ok(report);
        }

        let out = match &self.config.strategy {
            CompressionStrategy::Baseline => baseline(x),
            CompressionStrategy::TopK { space_savings } => {
                top_k(x, retain_count_for(x.len(), *space_savings))?
            }
            CompressionStrategy::RandK { space_savings, .. } => {
                rand_k(x, retain_count_for(x.len(), *space_savings), &mut self.rng)?
            }
            CompressionStrategy::UnbiasedRandK { space_savings, .. } => {
                let retain_count = retain_count_for(x.len(), *space_savings);
                if retain_count == x.len() {
                    baseline(x)
                } else {
                    unbiased_rand_k(x, retain_count, &mut self.rng)?
                }
            }
            CompressionStrategy::SparseTernary { space_savings } => {
                sparse_ternary(x, retain_count_for(x.len(), *space_savings))?
            }
            CompressionStrategy::SparseKMeans { budget_fraction, scale } => {
                let budget = budget_for(x, *budget_fraction);
                let result = if *scale {
                    let (scaler, scaled) = MinMaxScaler::fit_transform(x)?;
                    let mut result = sparse_kmeans(&scaled, budget, &self.config.kmeans)?;
                    result.compressed = scaler.inverse_transform(&result.compressed);
                    result
                } else {
                    sparse_kmeans(x, budget, &self.config.kmeans)?
                };

                report.bit_depth = Some(result.bit_depth);
                report.over_budget = result.over_budget();
                result.compressed
            }
        };

        report.mse = mse(x, &out)?.to_f64_lossy();
        report.after_nonzeros = count_nonzero(&out);
        report.after_bytes = size_of(&out);
        *layer = out;

        Ok(report)
    }
}
