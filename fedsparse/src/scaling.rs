//! # Min-Max Scaling
//!
//! Maps a layer onto `[0, 1]` before clustering so that the evenly spaced
//! initial centroids cover the whole value range, and maps the quantized
//! result back afterwards.

use serde::{Deserialize, Serialize};

use crate::core::Scalar;
use crate::error::{FedSparseError, Result};

/// Fitted min-max transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler<T> {
    pub min: T,
    pub max: T,
}

impl<T: Scalar> MinMaxScaler<T> {
    /// Record the range of `x`
    pub fn fit(x: &[T]) -> Result<Self> {
        let mut iter = x.iter().copied();
        let first = iter
            .next()
            .ok_or_else(|| FedSparseError::InvalidInput("cannot fit scaler on empty vector".to_string()))?;

        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Ok(Self { min, max })
    }

    #[inline]
    fn range(&self) -> T {
        self.max - self.min
    }

    /// `(x - min) / (max - min)`; a constant vector maps to zeros
    pub fn transform(&self, x: &[T]) -> Vec<T> {
        let range = self.range();
        if range == T::zero() {
            return vec![T::zero(); x.len()];
        }
        x.iter().map(|&v| (v - self.min) / range).collect()
    }

    /// `y * (max - min) + min`
    pub fn inverse_transform(&self, y: &[T]) -> Vec<T> {
        let range = self.range();
        y.iter().map(|&v| v * range + self.min).collect()
    }

    /// Fit and transform in one step
    pub fn fit_transform(x: &[T]) -> Result<(Self, Vec<T>)> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x);
        Ok((scaler, scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit() {
        let scaler = MinMaxScaler::fit(&[3.0, -1.0, 7.0, 2.0]).unwrap();
        assert_eq!(scaler.min, -1.0);
        assert_eq!(scaler.max, 7.0);
    }

    #[test]
    fn test_transform_unit_range() {
        let x = [-1.0, 3.0, 7.0];
        let (scaler, scaled) = MinMaxScaler::fit_transform(&x).unwrap();
        assert_eq!(scaled, vec![0.0, 0.5, 1.0]);
        assert_eq!(scaler.inverse_transform(&scaled), x.to_vec());
    }

    #[test]
    fn test_constant_vector() {
        let x = [2.5f32; 4];
        let (scaler, scaled) = MinMaxScaler::fit_transform(&x).unwrap();
        assert_eq!(scaled, vec![0.0; 4]);
        assert_eq!(scaler.inverse_transform(&scaled), x.to_vec());
    }

    #[test]
    fn test_empty() {
        assert!(MinMaxScaler::<f64>::fit(&[]).is_err());
    }
}
