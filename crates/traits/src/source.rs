//! Market data source trait definitions.

use famafrench_primitives::{AssetFundamental, PriceSeries, RateSeries, SeriesError, Symbol};

/// Errors raised by market data sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Requested series does not exist in the source.
    #[error("series not found: {0}")]
    NotFound(String),

    /// Record could not be parsed.
    #[error("parse error in {context}: {message}")]
    Parse {
        /// Where the bad record was found.
        context: String,
        /// What went wrong.
        message: String,
    },

    /// Series violated its ordering or finiteness invariants.
    #[error("invalid series {name}: {source}")]
    InvalidSeries {
        /// Series name.
        name: String,
        /// Underlying series error.
        source: SeriesError,
    },

    /// Upstream provider failure.
    #[error("provider error: {0}")]
    Provider(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Returns whether the run can continue without the affected series.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Parse { .. } | Self::InvalidSeries { .. })
    }
}

/// Provider of fundamentals and daily price history.
///
/// A `None` or empty price series means "not found": the symbol is skipped with a warning.
/// The risk-free series and the market proxies are required and their absence is fatal to a run.
pub trait MarketDataSource {
    /// Fundamental snapshots for the requested universe. Unknown symbols are omitted.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying store cannot be read.
    fn fundamentals(&self, universe: &[Symbol]) -> Result<Vec<AssetFundamental>, SourceError>;

    /// Daily closing prices for one symbol.
    ///
    /// # Errors
    /// Returns `SourceError` if the underlying store cannot be read.
    fn price_series(&self, symbol: &Symbol) -> Result<Option<PriceSeries>, SourceError>;

    /// Annualized risk-free rates keyed by date.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` if the source has no risk-free series.
    fn risk_free_rates(&self) -> Result<RateSeries, SourceError>;

    /// Daily closing prices of a market proxy index.
    ///
    /// # Errors
    /// Returns `SourceError::NotFound` if the proxy is unavailable.
    fn market_proxy_series(&self, name: &str) -> Result<PriceSeries, SourceError>;
}
