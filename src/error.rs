//! Error types for the layered diffusion entry points.
//!
//! The numerical kernels never fail: non-finite values propagate silently
//! and dry columns are a caller precondition. Errors are only raised by the
//! field-level entry points, which check shapes and configuration before
//! touching any data.

use thiserror::Error;

/// Errors raised when validating fields or configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayeredError {
    /// A field does not match the grid it is used with.
    #[error("Shape mismatch for `{field}`: expected {expected}, got {actual}")]
    ShapeMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// A layered field or grid was built with zero layers.
    #[error("Layer count must be at least 1")]
    NoLayers,

    /// Grid dimensions or spacing are unusable.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LayeredError {
    /// Create a shape mismatch error.
    pub fn shape_mismatch(
        field: &'static str,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ShapeMismatch {
            field,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LayeredError>;
