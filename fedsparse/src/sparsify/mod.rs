//! # Elementary Sparsifiers
//!
//! Stateless maps from a gradient and a retention count to a sparsified
//! gradient of the same length:
//! - **top-k**: keep the `retain_count` largest-magnitude entries
//! - **rand-k**: keep `retain_count` uniformly random entries
//! - **unbiased rand-k**: rand-k rescaled by `len / retain_count`
//! - **sparse ternary**: top-k with survivors clipped to ± their mean magnitude
//! - **baseline**: no compression
//!
//! Stochastic sparsifiers take the generator from the caller; nothing here
//! touches global random state.

pub mod compressor;

pub use compressor::*;

use rand::Rng;

use crate::core::{Scalar, largest_magnitude_indices, mean_magnitude};
use crate::error::{Result, ensure};

fn check_retain_count(len: usize, retain_count: usize) -> Result<()> {
    ensure(retain_count <= len, || {
        format!("retain_count {} must be in [0, {}]", retain_count, len)
    })
}

/// Copy only `indices` of `x` into an otherwise zero vector
fn keep_indices<T: Scalar>(x: &[T], indices: impl IntoIterator<Item = usize>) -> Vec<T> {
    let mut out = vec![T::zero(); x.len()];
    for i in indices {
        out[i] = x[i];
    }
    out
}

/// Identity: the uncompressed control
pub fn baseline<T: Scalar>(x: &[T]) -> Vec<T> {
    x.to_vec()
}

/// Top-k sparsification
///
/// Zeros all but the `retain_count` largest-magnitude entries. Entries that
/// are already zero stay zero, so fewer than `retain_count` survivors is
/// possible on sparse input.
pub fn top_k<T: Scalar>(x: &[T], retain_count: usize) -> Result<Vec<T>> {
    check_retain_count(x.len(), retain_count)?;
    if retain_count == x.len() {
        return Ok(x.to_vec());
    }

    Ok(keep_indices(x, largest_magnitude_indices(x, retain_count)))
}

/// Biased random sparsification
///
/// Keeps `retain_count` indices sampled without replacement from `rng`.
pub fn rand_k<T: Scalar, R: Rng + ?Sized>(x: &[T], retain_count: usize, rng: &mut R) -> Result<Vec<T>> {
    check_retain_count(x.len(), retain_count)?;
    if x.is_empty() {
        return Ok(Vec::new());
    }
    if retain_count == x.len() {
        return Ok(x.to_vec());
    }

    let picked = rand::seq::index::sample(rng, x.len(), retain_count);
    Ok(keep_indices(x, picked))
}

/// Unbiased random sparsification: `len / retain_count · rand_k(x)`
pub fn unbiased_rand_k<T: Scalar, R: Rng + ?Sized>(
    x: &[T],
    retain_count: usize,
    rng: &mut R,
) -> Result<Vec<T>> {
    ensure(retain_count > 0 && retain_count < x.len(), || {
        format!(
            "unbiased rand-k needs 0 < retain_count < {}, got {}",
            x.len(),
            retain_count
        )
    })?;

    let scale = T::from_usize(x.len()) / T::from_usize(retain_count);
    let sparse = rand_k(x, retain_count, rng)?;

    Ok(sparse.into_iter().map(|v| v * scale).collect())
}

/// Sparse ternary compression
///
/// Selects the top-`retain_count` entries by magnitude and replaces each
/// survivor with `±mean`, the mean magnitude of the survivors.
pub fn sparse_ternary<T: Scalar>(x: &[T], retain_count: usize) -> Result<Vec<T>> {
    check_retain_count(x.len(), retain_count)?;

    let selected = largest_magnitude_indices(x, retain_count);
    let mu = mean_magnitude(x, &selected);

    let mut out = vec![T::zero(); x.len()];
    for i in selected {
        // signum(0.0) is 1.0, zero survivors must stay zero
        if x[i] > T::zero() {
            out[i] = mu;
        } else if x[i] < T::zero() {
            out[i] = -mu;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::count_nonzero;
    use crate::error::FedSparseError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn numbers() -> Vec<f64> {
        vec![28.0, 39.0, -56.0, -48.0, 11.0, 66.0, 80.0, 92.0, 93.0, -30.0]
    }

    #[test]
    fn test_top_k_counts() {
        let x = numbers();
        for k in 0..=x.len() {
            let cx = top_k(&x, k).unwrap();
            assert_eq!(count_nonzero(&cx), k, "k = {}", k);
        }
    }

    #[test]
    fn test_top_k_known_vector() {
        let actual = top_k(&numbers(), 8).unwrap();
        let expected = vec![0.0, 39.0, -56.0, -48.0, 0.0, 66.0, 80.0, 92.0, 93.0, -30.0];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_top_k_symmetric_vector() {
        let x = [-5.0, -4.0, -3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let actual = top_k(&x, 8).unwrap();
        assert_eq!(actual, vec![-5.0, -4.0, -3.0, -2.0, 0.0, 0.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_top_k_keep_all() {
        let x = numbers();
        assert_eq!(top_k(&x, x.len()).unwrap(), x);
    }

    #[test]
    fn test_top_k_out_of_range() {
        let err = top_k(&numbers(), 11).unwrap_err();
        assert!(matches!(err, FedSparseError::ConstraintViolation(_)));
    }

    #[test]
    fn test_top_k_already_sparse_is_unchanged() {
        let x = [0.0, 3.0, 0.0, 0.0, -1.0, 0.0];
        assert_eq!(top_k(&x, 2).unwrap(), x.to_vec());
        // Extra retention budget cannot resurrect zeros
        assert_eq!(top_k(&x, 4).unwrap(), x.to_vec());
    }

    #[test]
    fn test_top_k_ties_keep_threshold() {
        let x = [2.0f64, -2.0, 2.0, 1.0, -2.0];
        let cx = top_k(&x, 3).unwrap();
        assert_eq!(count_nonzero(&cx), 3);
        assert!(cx.iter().all(|v| *v == 0.0 || v.abs() == 2.0));
        assert_eq!(cx[3], 0.0);
    }

    #[test]
    fn test_rand_k_counts() {
        let mut rng = StdRng::seed_from_u64(7);
        let x = numbers();
        for k in 0..=x.len() {
            let cx = rand_k(&x, k, &mut rng).unwrap();
            assert_eq!(count_nonzero(&cx), k, "k = {}", k);
            for (orig, kept) in x.iter().zip(&cx) {
                assert!(*kept == 0.0 || kept == orig);
            }
        }
    }

    #[test]
    fn test_rand_k_keep_all_and_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let x = numbers();
        assert_eq!(rand_k(&x, x.len(), &mut rng).unwrap(), x);
        assert!(rand_k::<f64, _>(&[], 0, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_rand_k_varies_with_rng_state() {
        let mut rng = StdRng::seed_from_u64(42);
        let x: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let first = rand_k(&x, 10, &mut rng).unwrap();
        let second = rand_k(&x, 10, &mut rng).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_rand_k_out_of_range() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(rand_k(&[1.0, 2.0], 3, &mut rng).is_err());
    }

    #[test]
    fn test_unbiased_rand_k_scaling() {
        let mut rng = StdRng::seed_from_u64(3);
        let x = [1.0, 2.0, 3.0, 4.0];
        let cx = unbiased_rand_k(&x, 2, &mut rng).unwrap();
        assert_eq!(count_nonzero(&cx), 2);
        for (orig, kept) in x.iter().zip(&cx) {
            assert!(*kept == 0.0 || *kept == orig * 2.0);
        }
    }

    #[test]
    fn test_unbiased_rand_k_expectation() {
        let mut rng = StdRng::seed_from_u64(2024);
        let x = [1.0, -2.0, 3.0, -4.0, 5.0];
        let trials = 20_000;

        let mut acc = [0.0; 5];
        for _ in 0..trials {
            let cx = unbiased_rand_k(&x, 2, &mut rng).unwrap();
            for (a, v) in acc.iter_mut().zip(cx) {
                *a += v;
            }
        }

        for (a, orig) in acc.iter().zip(x) {
            let mean = a / trials as f64;
            assert!((mean - orig).abs() < 0.15 * orig.abs().max(1.0), "{} vs {}", mean, orig);
        }
    }

    #[test]
    fn test_unbiased_rand_k_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        let x = [1.0, 2.0, 3.0];
        assert!(unbiased_rand_k(&x, 0, &mut rng).is_err());
        assert!(unbiased_rand_k(&x, 3, &mut rng).is_err());
    }

    #[test]
    fn test_sparse_ternary() {
        let x = [-5.0, -4.0, -3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let actual = sparse_ternary(&x, 8).unwrap();
        let expected = vec![-3.5, -3.5, -3.5, -3.5, 0.0, 0.0, 3.5, 3.5, 3.5, 3.5];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_sparse_ternary_levels() {
        let x = numbers();
        let cx = sparse_ternary(&x, 8).unwrap();
        let mu = (39.0 + 56.0 + 48.0 + 66.0 + 80.0 + 92.0 + 93.0 + 30.0) / 8.0;
        assert!(cx.iter().all(|v| *v == 0.0 || *v == mu || *v == -mu));
        assert_eq!(count_nonzero(&cx), 8);
    }

    #[test]
    fn test_sparse_ternary_zero_survivor() {
        let x = [0.0f32, 0.0, 4.0];
        let cx = sparse_ternary(&x, 2).unwrap();
        assert_eq!(cx[2], 2.0);
        assert_eq!(count_nonzero(&cx), 1);
    }

    #[test]
    fn test_baseline() {
        let x = numbers();
        assert_eq!(baseline(&x), x);
    }
}
