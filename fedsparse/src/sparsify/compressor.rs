//! Compressor capability trait and its sparsifier implementations

use rand::Rng;

use crate::core::Scalar;
use crate::error::Result;
use crate::size;

/// A lossy gradient compressor
///
/// Implementors are independent variants; there is no shared base state.
/// `compress` takes `&mut self` so stochastic compressors can advance the
/// generator they were handed.
pub trait Compressor<T: Scalar> {
    /// Compress `x` into a vector of the same length
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>>;

    /// Footprint of a compressed vector in bytes
    fn size_of(&self, x: &[T]) -> usize {
        size::size_of(x)
    }

    /// Short method name for logs and reports
    fn name(&self) -> &'static str;
}

/// No-op compressor
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl<T: Scalar> Compressor<T> for Baseline {
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>> {
        Ok(super::baseline(x))
    }

    fn name(&self) -> &'static str {
        "baseline"
    }
}

/// Top-k compressor with a fixed retention count
#[derive(Debug, Clone, Copy)]
pub struct TopK {
    pub retain_count: usize,
}

impl TopK {
    pub fn new(retain_count: usize) -> Self {
        Self { retain_count }
    }
}

impl<T: Scalar> Compressor<T> for TopK {
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>> {
        super::top_k(x, self.retain_count)
    }

    fn name(&self) -> &'static str {
        "top_k"
    }
}

/// Rand-k compressor owning its injected generator
#[derive(Debug, Clone)]
pub struct RandK<R> {
    pub retain_count: usize,
    rng: R,
}

impl<R: Rng> RandK<R> {
    pub fn new(retain_count: usize, rng: R) -> Self {
        Self { retain_count, rng }
    }

    /// Hand the generator back to the caller
    pub fn into_rng(self) -> R {
        self.rng
    }
}

impl<T: Scalar, R: Rng> Compressor<T> for RandK<R> {
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>> {
        super::rand_k(x, self.retain_count, &mut self.rng)
    }

    fn name(&self) -> &'static str {
        "rand_k"
    }
}

/// Unbiased rand-k compressor
#[derive(Debug, Clone)]
pub struct UnbiasedRandK<R> {
    pub retain_count: usize,
    rng: R,
}

impl<R: Rng> UnbiasedRandK<R> {
    pub fn new(retain_count: usize, rng: R) -> Self {
        Self { retain_count, rng }
    }
}

impl<T: Scalar, R: Rng> Compressor<T> for UnbiasedRandK<R> {
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>> {
        super::unbiased_rand_k(x, self.retain_count, &mut self.rng)
    }

    fn name(&self) -> &'static str {
        "unbiased_rand_k"
    }
}

/// Sparse ternary compressor
#[derive(Debug, Clone, Copy)]
pub struct SparseTernary {
    pub retain_count: usize,
}

impl SparseTernary {
    pub fn new(retain_count: usize) -> Self {
        Self { retain_count }
    }
}

impl<T: Scalar> Compressor<T> for SparseTernary {
    fn compress(&mut self, x: &[T]) -> Result<Vec<T>> {
        super::sparse_ternary(x, self.retain_count)
    }

    fn name(&self) -> &'static str {
        "sparse_ternary"
    }
}
