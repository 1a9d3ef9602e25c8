//! Error types for portfolio construction.

/// Errors that can occur while building bucket portfolios.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    /// Table utility error.
    #[error("table error: {0}")]
    Utils(#[from] famafrench_utils::UtilsError),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
