//! Per-asset three-factor OLS.

use famafrench_math::{MathError, add_intercept, ordinary_least_squares};
use famafrench_primitives::{Diagnostic, DiagnosticKind, RISK_FREE_COLUMN, RegressionResult, Symbol};
use famafrench_traits::{EstimatorError, FactorRegressor};
use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

use crate::{FactorTable, ModelError};

/// Configuration for the OLS regressor.
#[derive(Debug, Clone)]
pub struct OlsConfig {
    /// Minimum complete observations for a fit.
    pub min_observations: usize,
}

impl Default for OlsConfig {
    fn default() -> Self {
        Self { min_observations: 20 }
    }
}

/// Fits `r = alpha + b_mkt * excess_return + b_smb * SMB + b_hml * HML + e` by OLS.
#[derive(Debug, Clone)]
pub struct OlsFactorRegressor {
    config: OlsConfig,
}

impl OlsFactorRegressor {
    /// Create a regressor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OlsConfig::default())
    }
}

impl Default for OlsFactorRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl FactorRegressor for OlsFactorRegressor {
    type Config = OlsConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn fit(
        &self,
        symbol: &Symbol,
        returns: &Array1<f64>,
        factors: &Array2<f64>,
    ) -> Result<RegressionResult, EstimatorError> {
        let n = returns.len();

        if factors.nrows() != n {
            return Err(EstimatorError::DimensionMismatch {
                expected: n,
                actual: factors.nrows(),
                context: "factors".to_string(),
            });
        }
        if factors.ncols() != 3 {
            return Err(EstimatorError::DimensionMismatch {
                expected: 3,
                actual: factors.ncols(),
                context: "factor columns".to_string(),
            });
        }
        if n < self.config.min_observations {
            return Err(EstimatorError::InsufficientData {
                required: self.config.min_observations,
                actual: n,
            });
        }

        let fit = ordinary_least_squares(returns, &add_intercept(factors)).map_err(|e| match e {
            MathError::Singular => EstimatorError::Singular,
            MathError::ZeroVariance => EstimatorError::ZeroVariance,
            other => EstimatorError::LinearAlgebra(other.to_string()),
        })?;

        let beta = &fit.coefficients;
        Ok(RegressionResult {
            symbol: symbol.clone(),
            alpha: beta[0],
            beta_market: beta[1],
            beta_smb: beta[2],
            beta_hml: beta[3],
            rsquared: fit.r_squared,
            observations: n,
            residuals: fit.residuals.to_vec(),
        })
    }

    fn min_observations(&self) -> usize {
        self.config.min_observations
    }
}

/// Fitted results plus every symbol skipped along the way.
#[derive(Debug, Clone, Default)]
pub struct RegressionOutcome {
    /// Successful fits in candidate order.
    pub results: Vec<RegressionResult>,
    /// Skipped symbols with reasons.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs a regressor over every candidate column of a factor table.
#[derive(Debug, Clone)]
pub struct RegressionEngine<R = OlsFactorRegressor> {
    regressor: R,
    excess_returns: bool,
}

impl<R: FactorRegressor> RegressionEngine<R> {
    /// Create an engine that regresses raw asset returns.
    #[must_use]
    pub const fn new(regressor: R) -> Self {
        Self { regressor, excess_returns: false }
    }

    /// Regress asset returns net of the risk-free rate instead.
    #[must_use]
    pub const fn with_excess_returns(mut self, excess_returns: bool) -> Self {
        self.excess_returns = excess_returns;
        self
    }

    /// Fit every candidate. Per-symbol failures become diagnostics.
    ///
    /// # Errors
    /// Returns an error for failures that are not specific to one symbol, such as a missing
    /// factor column.
    pub fn regress_all(
        &self,
        factors: &FactorTable,
        candidates: &[Symbol],
    ) -> Result<RegressionOutcome, ModelError> {
        let x = factors.factor_matrix()?;
        let risk_free = if self.excess_returns {
            Some(Array1::from(factors.values(RISK_FREE_COLUMN)?))
        } else {
            None
        };

        let mut outcome = RegressionOutcome::default();
        for symbol in candidates {
            if !factors.has_column(symbol) {
                warn!(%symbol, "no return column in factor table");
                outcome.diagnostics.push(Diagnostic::new(
                    symbol.clone(),
                    DiagnosticKind::MissingData,
                    "no return column in factor table",
                ));
                continue;
            }
            let mut y = Array1::from(factors.values(symbol.as_str())?);
            if let Some(rf) = &risk_free {
                y -= rf;
            }

            match self.regressor.fit(symbol, &y, &x) {
                Ok(result) => {
                    debug!(%symbol, alpha = result.alpha, rsquared = result.rsquared, "fitted");
                    outcome.results.push(result);
                }
                Err(e) if e.is_degenerate() => {
                    warn!(%symbol, error = %e, "degenerate fit, dropping symbol");
                    outcome.diagnostics.push(Diagnostic::new(
                        symbol.clone(),
                        DiagnosticKind::DegenerateFit,
                        e.to_string(),
                    ));
                }
                Err(e @ EstimatorError::InsufficientData { .. }) => {
                    warn!(%symbol, error = %e, "insufficient history, skipping");
                    outcome.diagnostics.push(Diagnostic::new(
                        symbol.clone(),
                        DiagnosticKind::InsufficientHistory,
                        e.to_string(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            fitted = outcome.results.len(),
            skipped = outcome.diagnostics.len(),
            "regressions complete"
        );
        Ok(outcome)
    }
}
