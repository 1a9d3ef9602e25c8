//! Regression result definitions.

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Three-factor OLS fit for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Intercept.
    pub alpha: f64,
    /// Loading on the market excess return.
    pub beta_market: f64,
    /// Loading on SMB.
    pub beta_smb: f64,
    /// Loading on HML.
    pub beta_hml: f64,
    /// Coefficient of determination.
    pub rsquared: f64,
    /// Number of observations used in the fit.
    pub observations: usize,
    /// Residual returns in date order.
    #[serde(skip)]
    pub residuals: Vec<f64>,
}
