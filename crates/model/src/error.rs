//! Error types for the pipeline.

use famafrench_math::MathError;
use famafrench_portfolios::PortfolioError;
use famafrench_traits::{EstimatorError, SourceError};
use famafrench_utils::UtilsError;

/// Errors that can occur while building factors or running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Table utility error.
    #[error("table error: {0}")]
    Utils(#[from] UtilsError),

    /// Portfolio construction error.
    #[error("portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    /// Market data source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A series every run depends on is unavailable.
    #[error("required series unavailable: {0}")]
    Configuration(String),

    /// No row of the factor table survived gap removal.
    #[error("factor table has no complete rows")]
    EmptyFactorTable,

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Returns whether this error only affects a single symbol.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Estimator(e) => e.is_recoverable(),
            Self::Source(e) => e.is_recoverable(),
            _ => false,
        }
    }
}
