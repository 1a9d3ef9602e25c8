//! Error types for data collaborators.

use std::path::PathBuf;

use famafrench_primitives::SeriesError;
use famafrench_traits::SourceError;

/// Errors raised while reading or writing CSV tables.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// CSV reader or writer failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars failure while writing a frame.
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// A required file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A date cell could not be parsed.
    #[error("invalid date {value:?} in {}", path.display())]
    InvalidDate {
        /// File containing the bad row.
        path: PathBuf,
        /// Raw cell contents.
        value: String,
    },

    /// A file parsed but violated series invariants.
    #[error("invalid series in {}: {source}", path.display())]
    Series {
        /// File containing the series.
        path: PathBuf,
        /// Underlying series error.
        source: SeriesError,
    },
}

impl IoError {
    /// Returns whether the failure concerns one file and the run can continue without it.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Csv(_) | Self::NotFound(_) | Self::InvalidDate { .. } | Self::Series { .. }
        )
    }
}

impl From<IoError> for SourceError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::NotFound(path) => Self::NotFound(path.display().to_string()),
            IoError::InvalidDate { path, value } => Self::Parse {
                context: path.display().to_string(),
                message: format!("invalid date {value:?}"),
            },
            IoError::Series { path, source } => {
                Self::InvalidSeries { name: path.display().to_string(), source }
            }
            IoError::Csv(e) => Self::Parse { context: "csv".to_string(), message: e.to_string() },
            IoError::Io(e) => Self::Io(e),
            IoError::Polars(e) => Self::Provider(e.to_string()),
        }
    }
}
