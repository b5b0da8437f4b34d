//! Adaptive bit-depth search (sparse k-means)
//!
//! Greedy walk over `b = 1, 2, 3, …`: keep the deepest trial that still
//! lowered the objective, stop at the first one that did not. Not globally
//! optimal, only non-increasing along the explored prefix.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::KMeansConfig;
use crate::core::{Scalar, mse};
use crate::error::Result;
use crate::sparsify::Compressor;

use super::budgeted::{Quantization, compress_b};
use super::squared_distance;

/// Result of the adaptive search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansCompression<T> {
    /// Dequantized gradient, same length as the input
    pub compressed: Vec<T>,
    /// Mean squared error between input and `compressed`
    pub mse: T,
    /// Selected bit-depth
    pub bit_depth: u32,
    pub assignment: Vec<usize>,
    pub centroids: Vec<T>,
    /// Objective of every trial run, in bit-depth order; the last entry
    /// is the discarded stopping trial unless the search hit `max_bit_depth`
    pub objectives: Vec<T>,
    pub nonzero_assignments: usize,
    pub budget: usize,
}

impl<T: Scalar> KMeansCompression<T> {
    /// Allowed non-zero assignments at the selected depth
    pub fn budget_cap(&self) -> f64 {
        self.budget as f64 / self.bit_depth as f64
    }

    /// The selected trial ended above its cap
    pub fn over_budget(&self) -> bool {
        self.nonzero_assignments as f64 > self.budget_cap()
    }

    fn from_trial(gradient: &[T], best: Quantization<T>, objectives: Vec<T>) -> Result<Self> {
        let compressed = best.dequantize();
        let error = mse(gradient, &compressed)?;

        Ok(Self {
            compressed,
            mse: error,
            bit_depth: best.bit_depth,
            assignment: best.assignment,
            centroids: best.centroids,
            objectives,
            nonzero_assignments: best.nonzero_assignments,
            budget: best.budget,
        })
    }
}

/// Find the bit-depth that best compresses `gradient` under `budget`
pub fn sparse_kmeans<T: Scalar>(
    gradient: &[T],
    budget: usize,
    config: &KMeansConfig,
) -> Result<KMeansCompression<T>> {
    sparse_kmeans_with(gradient, budget, config, squared_distance)
}

/// [`sparse_kmeans`] with a custom elementwise distance
pub fn sparse_kmeans_with<T, D>(
    gradient: &[T],
    budget: usize,
    config: &KMeansConfig,
    dist: D,
) -> Result<KMeansCompression<T>>
where
    T: Scalar,
    D: Fn(T) -> T,
{
    let mut best = compress_b(gradient, 1, budget, config, &dist)?;
    let mut objectives = vec![best.objective];
    debug!(bit_depth = 1, objective = ?best.objective, nonzero = best.nonzero_assignments, "bit-depth trial");

    for bit_depth in 2..=config.max_bit_depth {
        let trial = compress_b(gradient, bit_depth, budget, config, &dist)?;
        objectives.push(trial.objective);
        debug!(bit_depth, objective = ?trial.objective, nonzero = trial.nonzero_assignments, "bit-depth trial");

        if trial.objective < best.objective {
            best = trial;
        } else {
            break;
        }
    }

    if best.over_budget() {
        debug!(
            bit_depth = best.bit_depth,
            nonzero = best.nonzero_assignments,
            cap = best.budget_cap(),
            "selected quantization exceeds budget"
        );
    }

    KMeansCompression::from_trial(gradient, best, objectives)
}

/// Sparse k-means as a [`Compressor`] with a fixed byte budget
#[derive(Debug, Clone)]
pub struct SparseKMeans {
    pub budget: usize,
    pub config: KMeansConfig,
}

impl SparseKMeans {
    pub fn new(budget: usize, config: KMeansConfig) -> Self {
        Self { budget, config }
    }
}

impl<T: Scalar> Compressor<T> for SparseKMeans {
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>> {
        Ok(sparse_kmeans(x, self.budget, &self.config)?.compressed)
    }

    fn name(&self) -> &'static str {
        "sparse_kmeans"
    }
}
