//! Compression configuration (fedsparse.toml)
//!
//! Parsing and validation of the settings a training client hands the
//! engine: which method to apply, which layers of the update to compress,
//! and the k-means search parameters.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FedSparseError, Result};
use crate::quantize::MAX_BIT_DEPTH;

/// Parameters of the budgeted k-means quantizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Iteration cap per bit-depth trial
    #[serde(default = "default_n_iters")]
    pub n_iters: usize,

    /// Stop once the centroid MSE between iterations drops below this
    #[serde(default = "default_tol")]
    pub tol: f64,

    /// Cap non-zero assignments at `budget / bit_depth` and pin centroid 0
    #[serde(default = "default_enforce_constraint")]
    pub enforce_constraint: bool,

    /// Largest bit-depth the adaptive search will try
    #[serde(default = "default_max_bit_depth")]
    pub max_bit_depth: u32,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_iters: default_n_iters(),
            tol: default_tol(),
            enforce_constraint: default_enforce_constraint(),
            max_bit_depth: default_max_bit_depth(),
        }
    }
}

fn default_n_iters() -> usize {
    10
}

fn default_tol() -> f64 {
    1e-8
}

fn default_enforce_constraint() -> bool {
    true
}

fn default_max_bit_depth() -> u32 {
    8
}

impl KMeansConfig {
    /// Check ranges; called by every quantizer entry point
    pub fn validate(&self) -> Result<()> {
        if self.n_iters == 0 {
            return Err(FedSparseError::ConstraintViolation(
                "n_iters must be at least 1".to_string(),
            ));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(FedSparseError::ConstraintViolation(format!(
                "tol must be a finite non-negative number, got {}",
                self.tol
            )));
        }
        if self.max_bit_depth == 0 || self.max_bit_depth > MAX_BIT_DEPTH {
            return Err(FedSparseError::ConstraintViolation(format!(
                "max_bit_depth must be in [1, {}], got {}",
                MAX_BIT_DEPTH, self.max_bit_depth
            )));
        }
        Ok(())
    }
}

/// Compression method applied to each selected layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CompressionStrategy {
    /// Send the update unmodified
    Baseline,

    /// Keep the `ceil((1 - space_savings) * len)` largest entries
    TopK { space_savings: f64 },

    /// Keep `ceil((1 - space_savings) * len)` random entries
    RandK {
        space_savings: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },

    /// Rand-k rescaled to be unbiased
    UnbiasedRandK {
        space_savings: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },

    /// Top-k with survivors clipped to ± their mean magnitude
    SparseTernary { space_savings: f64 },

    /// Adaptive budgeted k-means with budget `floor(budget_fraction * bits)`
    SparseKMeans {
        budget_fraction: f64,
        /// Min-max scale to [0, 1] before clustering
        #[serde(default = "default_scale")]
        scale: bool,
    },
}

fn default_scale() -> bool {
    true
}

impl Default for CompressionStrategy {
    fn default() -> Self {
        CompressionStrategy::Baseline
    }
}

impl CompressionStrategy {
    /// Method name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            CompressionStrategy::Baseline => "baseline",
            CompressionStrategy::TopK { .. } => "top_k",
            CompressionStrategy::RandK { .. } => "rand_k",
            CompressionStrategy::UnbiasedRandK { .. } => "unbiased_rand_k",
            CompressionStrategy::SparseTernary { .. } => "sparse_ternary",
            CompressionStrategy::SparseKMeans { .. } => "sparse_kmeans",
        }
    }

    /// Seed for stochastic methods, if one was pinned
    pub fn seed(&self) -> Option<u64> {
        match self {
            CompressionStrategy::RandK { seed, .. }
            | CompressionStrategy::UnbiasedRandK { seed, .. } => *seed,
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            CompressionStrategy::Baseline => Ok(()),
            CompressionStrategy::UnbiasedRandK { space_savings, .. } => {
                // rescaling by len / retain_count needs at least one survivor
                if (0.0..1.0).contains(space_savings) {
                    Ok(())
                } else {
                    Err(FedSparseError::ConstraintViolation(format!(
                        "unbiased_rand_k space_savings must be in [0, 1), got {}",
                        space_savings
                    )))
                }
            }
            CompressionStrategy::TopK { space_savings }
            | CompressionStrategy::RandK { space_savings, .. }
            | CompressionStrategy::SparseTernary { space_savings } => {
                if (0.0..=1.0).contains(space_savings) {
                    Ok(())
                } else {
                    Err(FedSparseError::ConstraintViolation(format!(
                        "space_savings must be in [0, 1], got {}",
                        space_savings
                    )))
                }
            }
            CompressionStrategy::SparseKMeans { budget_fraction, .. } => {
                if *budget_fraction > 0.0 && *budget_fraction <= 1.0 {
                    Ok(())
                } else {
                    Err(FedSparseError::ConstraintViolation(format!(
                        "budget_fraction must be in (0, 1], got {}",
                        budget_fraction
                    )))
                }
            }
        }
    }
}

/// Top-level compression configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Indices of update layers to compress; empty means all layers
    #[serde(default)]
    pub layers_to_compress: Vec<usize>,

    /// Method applied to every selected layer
    #[serde(default)]
    pub strategy: CompressionStrategy,

    /// Quantizer settings, used by `sparse_kmeans`
    #[serde(default)]
    pub kmeans: KMeansConfig,
}

impl CompressionConfig {
    pub fn new(strategy: CompressionStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Restrict compression to the given layer indices
    pub fn with_layers(mut self, layers: impl Into<Vec<usize>>) -> Self {
        self.layers_to_compress = layers.into();
        self
    }

    /// Parse and validate a configuration from TOML
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FedSparseError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Serialize configuration to TOML
    pub fn to_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.layers_to_compress.iter().find(|&&l| !seen.insert(l)) {
            return Err(FedSparseError::ConstraintViolation(format!(
                "layer {} listed more than once in layers_to_compress",
                dup
            )));
        }
        self.strategy.validate()?;
        self.kmeans.validate()
    }
}
