//! Fama-French factor construction.

use std::collections::BTreeSet;

use famafrench_math::annualized_volatility;
use famafrench_primitives::{
    Bucket, DATE_COLUMN, Date, Diagnostic, DiagnosticKind, Factor, FactorObservation,
    MARKET_COLUMN, RISK_FREE_COLUMN, RateSeries, Symbol,
};
use famafrench_utils::{
    column_values, date_column, frame_from_columns, full_join_on_date, interpolate_forward,
    percentage_returns, value_columns,
};
use ndarray::Array2;
use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::ModelError;

/// Configuration for factor construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorConfig {
    /// Index price columns summed into the market portfolio.
    pub market_proxies: Vec<String>,
    /// Annualized volatility above which candidate columns are dropped.
    pub volatility_ceiling: Option<f64>,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            market_proxies: vec!["NDX".to_string(), "NYA".to_string(), "XMI".to_string()],
            volatility_ceiling: None,
        }
    }
}

/// Column names that are never investable candidates: bucket portfolios, market proxies,
/// the summed market, the factors and the risk-free rate.
#[must_use]
pub fn reserved_columns(market_proxies: &[String]) -> BTreeSet<String> {
    Bucket::ALL
        .iter()
        .map(|b| b.column().to_string())
        .chain(market_proxies.iter().cloned())
        .chain(Factor::ALL.iter().map(|f| f.column().to_string()))
        .chain([MARKET_COLUMN.to_string(), RISK_FREE_COLUMN.to_string(), DATE_COLUMN.to_string()])
        .collect()
}

/// SMB: mean small-bucket return minus mean big-bucket return.
#[must_use]
pub fn smb_expr() -> Expr {
    let third = lit(1.0 / 3.0);
    let small = col("sg") + col("sn") + col("sv");
    let big = col("bg") + col("bn") + col("bv");
    (third.clone() * small - third * big).alias(Factor::Smb.column())
}

/// HML: mean value-bucket return minus mean growth-bucket return.
#[must_use]
pub fn hml_expr() -> Expr {
    let half = lit(0.5);
    let value = col("sv") + col("bv");
    let growth = col("sg") + col("bg");
    (half.clone() * value - half * growth).alias(Factor::Hml.column())
}

/// Date-indexed table of complete rows: asset returns, bucket returns, proxies, market,
/// risk-free rate and the three factors.
#[derive(Debug, Clone)]
pub struct FactorTable {
    frame: DataFrame,
    diagnostics: Vec<Diagnostic>,
}

impl FactorTable {
    /// Wrap an existing frame.
    ///
    /// # Errors
    /// Returns `ModelError::MissingColumn` if a factor column is absent and
    /// `ModelError::EmptyFactorTable` if the frame has no rows.
    pub fn from_frame(frame: DataFrame) -> Result<Self, ModelError> {
        for name in [DATE_COLUMN].into_iter().chain(Factor::ALL.iter().map(|f| f.column())) {
            if frame.column(name).is_err() {
                return Err(ModelError::MissingColumn(name.to_string()));
            }
        }
        if frame.height() == 0 {
            return Err(ModelError::EmptyFactorTable);
        }
        Ok(Self { frame, diagnostics: Vec::new() })
    }

    /// Underlying frame.
    #[must_use]
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Number of complete rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Columns screened out while building.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether a return column exists for `symbol`.
    #[must_use]
    pub fn has_column(&self, symbol: &Symbol) -> bool {
        self.frame.column(symbol.as_str()).is_ok()
    }

    /// Values of one column. Rows are complete, so nulls never appear.
    ///
    /// # Errors
    /// Returns `ModelError::MissingColumn` if the column does not exist.
    pub fn values(&self, name: &str) -> Result<Vec<f64>, ModelError> {
        let values = column_values(&self.frame, name).map_err(|e| match e {
            famafrench_utils::UtilsError::MissingColumn(c) => ModelError::MissingColumn(c),
            other => other.into(),
        })?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }

    /// Design matrix `(n_obs x 3)` with columns excess_return, SMB, HML.
    ///
    /// # Errors
    /// Returns an error if a factor column is missing.
    pub fn factor_matrix(&self) -> Result<Array2<f64>, ModelError> {
        let n = self.height();
        let mut x = Array2::zeros((n, Factor::ALL.len()));
        for (j, factor) in Factor::ALL.iter().enumerate() {
            for (i, v) in self.values(factor.column())?.into_iter().enumerate() {
                x[[i, j]] = v;
            }
        }
        Ok(x)
    }

    /// Per-date factor observations.
    ///
    /// # Errors
    /// Returns an error if the date or a factor column is missing.
    pub fn observations(&self) -> Result<Vec<FactorObservation>, ModelError> {
        let dates = date_column(&self.frame)?;
        let mkt = self.values(Factor::ExcessReturn.column())?;
        let smb = self.values(Factor::Smb.column())?;
        let hml = self.values(Factor::Hml.column())?;
        Ok(dates
            .into_iter()
            .zip(mkt)
            .zip(smb)
            .zip(hml)
            .map(|(((d, m), s), h)| FactorObservation::new(d, m, s, h))
            .collect())
    }

    /// Date, market, risk-free rate and factor columns only.
    ///
    /// # Errors
    /// Returns a polars error if a column is missing.
    pub fn factor_columns(&self) -> Result<DataFrame, ModelError> {
        let mut names = vec![DATE_COLUMN];
        for name in [MARKET_COLUMN, RISK_FREE_COLUMN] {
            if self.frame.column(name).is_ok() {
                names.push(name);
            }
        }
        names.extend(Factor::ALL.iter().map(|f| f.column()));
        Ok(self.frame.select(names)?)
    }
}

/// Builds the market excess return, SMB and HML from a wide price table.
#[derive(Debug, Clone, Default)]
pub struct FactorReturnsBuilder {
    config: FactorConfig,
}

impl FactorReturnsBuilder {
    /// Create a builder with default proxies and no volatility screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    #[must_use]
    pub const fn with_config(config: FactorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FactorConfig {
        &self.config
    }

    /// Build the factor table.
    ///
    /// # Arguments
    /// * `prices` - Wide price table holding candidates, the six bucket columns and the proxies
    /// * `risk_free_daily` - Daily risk-free rates
    ///
    /// # Errors
    /// Returns `ModelError::Configuration` if a proxy or the risk-free series is missing,
    /// `ModelError::MissingColumn` if a bucket column is missing and
    /// `ModelError::EmptyFactorTable` if no complete row remains.
    pub fn build(
        &self,
        prices: &DataFrame,
        risk_free_daily: &RateSeries,
    ) -> Result<FactorTable, ModelError> {
        let proxies = &self.config.market_proxies;
        for proxy in proxies {
            if prices.column(proxy).is_err() {
                return Err(ModelError::Configuration(format!("market proxy {proxy}")));
            }
        }
        for bucket in Bucket::ALL {
            if prices.column(bucket.column()).is_err() {
                return Err(ModelError::MissingColumn(bucket.column().to_string()));
            }
        }
        if risk_free_daily.is_empty() {
            return Err(ModelError::Configuration("risk-free rate series".to_string()));
        }

        let market = proxies
            .iter()
            .map(|p| col(p.as_str()))
            .reduce(|acc, c| acc + c)
            .ok_or_else(|| ModelError::InvalidConfig("no market proxies".to_string()))?;
        let with_market =
            prices.clone().lazy().with_column(market.alias(MARKET_COLUMN)).collect()?;

        let mut returns = percentage_returns(&with_market)?;
        let mut diagnostics = Vec::new();
        if let Some(ceiling) = self.config.volatility_ceiling {
            returns = screen_volatility(returns, ceiling, proxies, &mut diagnostics)?;
        }

        let (rf_dates, rf_values): (Vec<Date>, Vec<Option<f64>>) =
            risk_free_daily.iter().map(|(d, r)| (d, Some(r))).unzip();
        let rf = frame_from_columns(&rf_dates, [(RISK_FREE_COLUMN, rf_values)])?;
        let joined = full_join_on_date(&returns, &rf)?;

        let with_factors = joined
            .lazy()
            .with_columns([
                (col(MARKET_COLUMN) - col(RISK_FREE_COLUMN)).alias(Factor::ExcessReturn.column()),
                smb_expr(),
                hml_expr(),
            ])
            .collect()?;

        let frame = interpolate_forward(&with_factors)?;
        if frame.height() == 0 {
            return Err(ModelError::EmptyFactorTable);
        }
        info!(rows = frame.height(), columns = frame.width(), "built factor table");

        Ok(FactorTable { frame, diagnostics })
    }
}

fn screen_volatility(
    returns: DataFrame,
    ceiling: f64,
    proxies: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<DataFrame, ModelError> {
    let reserved = reserved_columns(proxies);
    let mut out = returns;
    for name in value_columns(&out) {
        if reserved.contains(&name) {
            continue;
        }
        let observed: Vec<f64> = column_values(&out, &name)?.into_iter().flatten().collect();
        let Some(vol) = annualized_volatility(&observed) else {
            continue;
        };
        if vol > ceiling {
            warn!(symbol = %name, vol, ceiling, "annualized volatility above ceiling, dropping");
            diagnostics.push(Diagnostic::new(
                Symbol::new(&name),
                DiagnosticKind::VolatilityScreen,
                format!("annualized volatility {vol:.4} exceeds {ceiling}"),
            ));
            out = out.drop(&name)?;
        } else {
            debug!(symbol = %name, vol, "volatility screen passed");
        }
    }
    Ok(out)
}
