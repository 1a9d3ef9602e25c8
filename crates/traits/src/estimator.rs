//! Factor loading estimation trait definitions.

use famafrench_primitives::{RegressionResult, Symbol};
use ndarray::{Array1, Array2};

/// Errors that can occur during estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Design matrix is singular.
    #[error("singular design matrix")]
    Singular,

    /// Outcome has zero variance so R-squared is undefined.
    #[error("outcome has zero variance")]
    ZeroVariance,

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl EstimatorError {
    /// Returns whether this error only affects the symbol being fitted.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::Singular | Self::ZeroVariance)
    }

    /// Returns whether the fit was degenerate rather than short of data.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Singular | Self::ZeroVariance)
    }
}

/// Estimates one asset's loadings on a set of factor return series.
pub trait FactorRegressor: Send + Sync {
    /// Configuration type for this regressor.
    type Config: Default + Clone + Send + Sync;

    /// Create a new regressor with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Fit one asset.
    ///
    /// # Arguments
    /// * `symbol` - Asset being fitted
    /// * `returns` - Asset returns (n_obs,)
    /// * `factors` - Factor returns (n_obs x 3), columns excess_return, SMB, HML
    ///
    /// # Errors
    /// Returns `EstimatorError` if dimensions mismatch, history is too short or the fit is
    /// degenerate.
    fn fit(
        &self,
        symbol: &Symbol,
        returns: &Array1<f64>,
        factors: &Array2<f64>,
    ) -> Result<RegressionResult, EstimatorError>;

    /// Minimum number of complete observations required for a fit.
    fn min_observations(&self) -> usize;
}
