//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Matrix is singular or nearly singular.
    #[error("matrix is singular or nearly singular")]
    Singular,

    /// Response has zero total variance.
    #[error("response has zero variance")]
    ZeroVariance,

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Numerical instability (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

impl MathError {
    /// Returns whether the error reflects a degenerate regression rather than bad input.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Singular | Self::ZeroVariance)
    }
}
