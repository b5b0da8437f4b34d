//! Error types for fedsparse

use thiserror::Error;

/// Result type for fedsparse operations
pub type Result<T> = std::result::Result<T, FedSparseError>;

/// fedsparse error types
///
/// Only hard failures live here. A quantization that stays over its byte
/// budget is reported through [`crate::Quantization::over_budget`], and an
/// emptied cluster simply decays to zero.
#[derive(Error, Debug)]
pub enum FedSparseError {
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl FedSparseError {
    /// Shorthand for a length mismatch between two vectors
    pub(crate) fn length_mismatch(expected: usize, actual: usize) -> Self {
        FedSparseError::ShapeMismatch {
            expected: format!("length {}", expected),
            actual: format!("length {}", actual),
        }
    }
}

impl From<std::io::Error> for FedSparseError {
    fn from(err: std::io::Error) -> Self {
        FedSparseError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FedSparseError {
    fn from(err: serde_json::Error) -> Self {
        FedSparseError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for FedSparseError {
    fn from(err: toml::de::Error) -> Self {
        FedSparseError::ConfigError(err.to_string())
    }
}

impl From<toml::ser::Error> for FedSparseError {
    fn from(err: toml::ser::Error) -> Self {
        FedSparseError::SerializationError(err.to_string())
    }
}

/// Fail with [`FedSparseError::ConstraintViolation`] unless `cond` holds
pub(crate) fn ensure(cond: bool, msg: impl FnOnce() -> String) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(FedSparseError::ConstraintViolation(msg()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure() {
        assert!(ensure(true, || "unused".into()).is_ok());

        let err = ensure(false, || "k = 11 exceeds length 10".into()).unwrap_err();
        assert!(matches!(err, FedSparseError::ConstraintViolation(_)));
        assert_eq!(err.to_string(), "Constraint violation: k = 11 exceeds length 10");
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = FedSparseError::length_mismatch(4, 3);
        assert_eq!(err.to_string(), "Shape mismatch: expected length 4, got length 3");
    }
}
