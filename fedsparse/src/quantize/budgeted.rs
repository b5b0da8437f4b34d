//! Budgeted quantization step: k-means at a fixed bit-depth
//!
//! Hard-assignment clustering of the elements of `g` onto `2^b` centroids
//! with centroid 0 acting as the sparsifier. When the constraint is
//! enforced, at most `budget / b` elements may map to a non-zero centroid;
//! surplus elements are pushed onto centroid 0 in order of how little
//! reconstruction error that costs (their ξ²).

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::KMeansConfig;
use crate::core::{Scalar, is_nonzero, max_value, mse, smallest_by_value};
use crate::error::{FedSparseError, Result, ensure};

use super::MAX_BIT_DEPTH;
use super::centroids::update_centroids;

/// Outcome of one bit-depth trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantization<T> {
    /// Σ_i min_j dist(g_i − θ_j) over the final centroids
    pub objective: T,
    /// Centroid index per element
    pub assignment: Vec<usize>,
    /// Final centroids; index 0 is the sparsifying centroid
    pub centroids: Vec<T>,
    pub bit_depth: u32,
    /// Iterations actually run (≤ n_iters)
    pub iterations: usize,
    /// Whether the centroid shift fell below `tol`
    pub converged: bool,
    /// Elements assigned to a centroid other than 0
    pub nonzero_assignments: usize,
    /// Byte budget the trial ran under
    pub budget: usize,
}

impl<T: Scalar> Quantization<T> {
    /// Allowed non-zero assignments: `budget / bit_depth`
    pub fn budget_cap(&self) -> f64 {
        self.budget as f64 / self.bit_depth as f64
    }

    /// Enforcement is best effort; this reports a residual shortfall
    pub fn over_budget(&self) -> bool {
        self.nonzero_assignments as f64 > self.budget_cap()
    }

    /// Replace every element by its centroid's value
    pub fn dequantize(&self) -> Vec<T> {
        self.assignment.iter().map(|&l| self.centroids[l]).collect()
    }
}

/// `n` centroids evenly spaced over `[0, top]`
fn even_centroids<T: Scalar>(top: T, n: usize) -> Vec<T> {
    let steps = T::from_usize(n - 1);
    (0..n).map(|j| top * T::from_usize(j) / steps).collect()
}

/// Nearest-centroid assignment with per-element ξ² = max(0, δ² − d²)
fn assign<T: Scalar, D: Fn(T) -> T>(g: &[T], theta: &[T], dist: &D, labels: &mut [usize], xi2: &mut [T]) {
    for ((&v, label), xi) in g.iter().zip(labels.iter_mut()).zip(xi2.iter_mut()) {
        let mut best = 0;
        let mut best_d = dist(v - theta[0]);
        for (j, &c) in theta.iter().enumerate().skip(1) {
            let d = dist(v - c);
            // strict: ties go to the lowest index
            if d < best_d {
                best = j;
                best_d = d;
            }
        }
        *label = best;
        *xi = (dist(v) - best_d).max(T::zero());
    }
}

/// Σ_i min_j dist(g_i − θ_j), ignoring the assignment
fn nearest_cost<T: Scalar, D: Fn(T) -> T>(g: &[T], theta: &[T], dist: &D) -> T {
    g.iter().fold(T::zero(), |acc, &v| {
        let nearest = theta.iter().fold(T::infinity(), |m, &c| m.min(dist(v - c)));
        acc + nearest
    })
}

fn count_nonzero_labels(labels: &[usize]) -> usize {
    labels.iter().filter(|&&l| l != 0).count()
}

/// Push surplus elements onto centroid 0 until `cap` is met
///
/// Relabels the `excess + 1` elements with the smallest non-zero ξ², one
/// more than the strict excess. Returns the new non-zero count.
fn enforce_budget<T: Scalar>(labels: &mut [usize], xi2: &[T], nonzero: usize, cap: f64) -> usize {
    let excess = (nonzero as f64 - cap).ceil() as usize;
    let candidates: Vec<usize> = (0..xi2.len()).filter(|&i| is_nonzero(xi2[i])).collect();

    for i in smallest_by_value(xi2, candidates, excess + 1) {
        labels[i] = 0;
    }

    count_nonzero_labels(labels)
}

/// Quantize `g` to `2^bit_depth` levels under a byte budget
///
/// `dist` is the elementwise distance; [`super::squared_distance`] gives
/// classic k-means. Parameter errors fail before any work is done. A result
/// that is still over budget is returned as-is, see
/// [`Quantization::over_budget`].
pub fn compress_b<T, D>(
    g: &[T],
    bit_depth: u32,
    budget: usize,
    config: &KMeansConfig,
    dist: D,
) -> Result<Quantization<T>>
where
    T: Scalar,
    D: Fn(T) -> T,
{
    config.validate()?;
    ensure((1..=MAX_BIT_DEPTH).contains(&bit_depth), || {
        format!("bit_depth must be in [1, {}], got {}", MAX_BIT_DEPTH, bit_depth)
    })?;
    ensure(budget > 0, || "budget must be greater than 0".to_string())?;
    let top = max_value(g)
        .ok_or_else(|| FedSparseError::InvalidInput("cannot quantize an empty vector".to_string()))?;

    let cap = budget as f64 / bit_depth as f64;
    let tol = T::from_f64(config.tol);

    let mut theta = even_centroids(top, 1usize << bit_depth);
    let mut labels = vec![0usize; g.len()];
    let mut xi2 = vec![T::zero(); g.len()];
    let mut iterations = 0;
    let mut converged = false;

    for iter in 0..config.n_iters {
        iterations = iter + 1;
        assign(g, &theta, &dist, &mut labels, &mut xi2);

        let mut nonzero = count_nonzero_labels(&labels);
        if config.enforce_constraint && nonzero as f64 > cap {
            let before = nonzero;
            nonzero = enforce_budget(&mut labels, &xi2, nonzero, cap);
            if nonzero as f64 > cap {
                debug!(bit_depth, iter, before, after = nonzero, cap, "sparsity constraint still violated");
            }
        }

        let mut theta_new = update_centroids(&theta, &labels, g)?;
        if config.enforce_constraint {
            theta_new[0] = T::zero();
        }

        let shift = mse(&theta_new, &theta)?;
        theta = theta_new;
        trace!(bit_depth, iter, nonzero, shift = ?shift, "k-means iteration");

        if shift < tol {
            converged = true;
            break;
        }
    }

    let objective = nearest_cost(g, &theta, &dist);

    Ok(Quantization {
        objective,
        nonzero_assignments: count_nonzero_labels(&labels),
        assignment: labels,
        centroids: theta,
        bit_depth,
        iterations,
        converged,
        budget,
    })
}
