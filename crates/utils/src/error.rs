//! Error types for utility functions.

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Stored day number does not map to a calendar date.
    #[error("invalid date value: {0}")]
    InvalidDate(i32),
}
