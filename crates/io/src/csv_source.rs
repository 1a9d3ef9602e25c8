//! CSV directory market data source.

use std::path::{Path, PathBuf};

use famafrench_primitives::{AssetFundamental, Date, PriceSeries, RateSeries, Symbol, TimeSeries};
use famafrench_traits::{MarketDataSource, SourceError};
use serde::Deserialize;
use tracing::{debug, info};

use crate::IoError;

/// Fundamentals file name.
pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

/// Risk-free rate file name.
pub const RISK_FREE_FILE: &str = "risk_free.csv";

/// Directory holding one price file per symbol and per market proxy.
pub const PRICES_DIR: &str = "prices";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct FundamentalRow {
    symbol: String,
    market_cap: Option<f64>,
    book_value_per_share: Option<f64>,
    shares_outstanding: Option<f64>,
}

impl FundamentalRow {
    fn into_fundamental(self) -> AssetFundamental {
        // Blank cells become NaN so the classifier reports them.
        AssetFundamental::new(
            Symbol::new(self.symbol),
            self.market_cap.unwrap_or(f64::NAN),
            self.book_value_per_share.unwrap_or(f64::NAN),
            self.shares_outstanding.unwrap_or(f64::NAN),
        )
    }
}

#[derive(Debug, Deserialize)]
struct DatedRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "close", alias = "Close", alias = "adjclose", alias = "rate")]
    value: Option<f64>,
}

/// Reads fundamentals, prices and risk-free rates from a directory of CSV files.
///
/// Files are read on every call, so the directory can be refreshed between runs.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    root: PathBuf,
}

impl CsvDirectorySource {
    /// Create a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every symbol listed in the fundamentals file, in file order.
    ///
    /// # Errors
    /// Returns `IoError::NotFound` if the fundamentals file is missing, or a CSV error.
    pub fn universe(&self) -> Result<Vec<Symbol>, IoError> {
        Ok(self.read_fundamentals()?.into_iter().map(|f| f.symbol).collect())
    }

    fn price_path(&self, name: &str) -> PathBuf {
        self.root.join(PRICES_DIR).join(format!("{name}.csv"))
    }

    fn read_fundamentals(&self) -> Result<Vec<AssetFundamental>, IoError> {
        let path = self.root.join(FUNDAMENTALS_FILE);
        if !path.is_file() {
            return Err(IoError::NotFound(path));
        }
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(&path)?;
        let mut out = Vec::new();
        for row in reader.deserialize::<FundamentalRow>() {
            out.push(row?.into_fundamental());
        }
        debug!(path = %path.display(), rows = out.len(), "read fundamentals");
        Ok(out)
    }
}

/// Read a `date,value` file into a series, skipping rows with a blank or non-finite value.
///
/// # Errors
/// Returns `IoError::NotFound` for a missing file, `IoError::InvalidDate` for an unparseable
/// date and `IoError::Series` for a repeated date.
pub fn read_dated_csv(path: &Path) -> Result<TimeSeries, IoError> {
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut series = TimeSeries::new();
    let mut skipped = 0_usize;
    for row in reader.deserialize::<DatedRow>() {
        let row = row?;
        let date = Date::parse_from_str(&row.date, DATE_FORMAT).map_err(|_| {
            IoError::InvalidDate { path: path.to_path_buf(), value: row.date.clone() }
        })?;
        let Some(value) = row.value.filter(|v| v.is_finite()) else {
            skipped += 1;
            continue;
        };
        series
            .insert(date, value)
            .map_err(|source| IoError::Series { path: path.to_path_buf(), source })?;
    }
    if skipped > 0 {
        debug!(path = %path.display(), skipped, "skipped rows without a usable value");
    }
    Ok(series)
}

impl MarketDataSource for CsvDirectorySource {
    fn fundamentals(&self, universe: &[Symbol]) -> Result<Vec<AssetFundamental>, SourceError> {
        let all = self.read_fundamentals()?;
        let found: Vec<AssetFundamental> =
            all.into_iter().filter(|f| universe.contains(&f.symbol)).collect();
        info!(requested = universe.len(), found = found.len(), "loaded fundamentals");
        Ok(found)
    }

    fn price_series(&self, symbol: &Symbol) -> Result<Option<PriceSeries>, SourceError> {
        let path = self.price_path(symbol.as_str());
        match read_dated_csv(&path) {
            Ok(series) if series.is_empty() => Ok(None),
            Ok(series) => Ok(Some(series)),
            Err(IoError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn risk_free_rates(&self) -> Result<RateSeries, SourceError> {
        Ok(read_dated_csv(&self.root.join(RISK_FREE_FILE))?)
    }

    fn market_proxy_series(&self, name: &str) -> Result<PriceSeries, SourceError> {
        Ok(read_dated_csv(&self.price_path(name))?)
    }
}
