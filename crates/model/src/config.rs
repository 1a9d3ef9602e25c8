//! Pipeline configuration.

use std::path::Path;

use famafrench_portfolios::ClassifyConfig;
use famafrench_primitives::Symbol;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Settings for the objective ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of candidates kept after sorting by objective.
    pub top_k: usize,
    /// Rows whose rounded alpha z-distance reaches this value are dropped.
    pub outlier_std: f64,
    /// Weight on the squared R-squared gap.
    pub rsquared_weight: f64,
    /// Weight on the squared alpha gap.
    pub alpha_weight: f64,
    /// Symbols never eligible for selection, in addition to the pipeline's own columns.
    pub exclude: Vec<Symbol>,
    /// Rows in the alpha leader report.
    pub alpha_leaders: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_k: 40,
            outlier_std: 6.0,
            rsquared_weight: 0.0008,
            alpha_weight: 0.9992,
            exclude: Vec::new(),
            alpha_leaders: 50,
        }
    }
}

/// Settings for the price-capped equal-weight shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualWeightConfig {
    /// Only symbols priced strictly below this are considered.
    pub price_ceiling: f64,
    /// Shortlist length.
    pub topx: usize,
    /// Capital spread across the shortlist.
    pub budget: f64,
}

impl Default for EqualWeightConfig {
    fn default() -> Self {
        Self { price_ceiling: 1000.0, topx: 10, budget: 10_000.0 }
    }
}

/// Every tunable constant of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum missing cells allowed in an aligned price column.
    pub nan_limit: usize,
    /// Assets with `|book_to_market|` at or below this are not bucketed.
    pub book_to_market_epsilon: f64,
    /// Assets with market cap at or below this are not bucketed.
    pub market_cap_epsilon: f64,
    /// Index series summed into the market portfolio.
    pub market_proxies: Vec<String>,
    /// Trailing risk-free observations used.
    pub risk_free_lookback: usize,
    /// Whether the risk-free source quotes rates in percent.
    pub risk_free_in_percent: bool,
    /// Annualized volatility above which candidates are screened out.
    pub volatility_ceiling: Option<f64>,
    /// Minimum complete observations for a regression.
    pub min_observations: usize,
    /// Regress asset returns net of the risk-free rate.
    pub regress_excess_returns: bool,
    /// Capital split evenly across the objective selection.
    pub investment_amount: f64,
    /// Objective ranking settings.
    pub ranking: RankingConfig,
    /// Equal-weight shortlist settings.
    pub equal_weight: EqualWeightConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            nan_limit: 10,
            book_to_market_epsilon: 1e-5,
            market_cap_epsilon: 1e-4,
            market_proxies: vec!["NDX".to_string(), "NYA".to_string(), "XMI".to_string()],
            risk_free_lookback: 250,
            risk_free_in_percent: true,
            volatility_ceiling: None,
            min_observations: 20,
            regress_excess_returns: false,
            investment_amount: 10_000.0,
            ranking: RankingConfig::default(),
            equal_weight: EqualWeightConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document. Absent keys take their defaults.
    ///
    /// # Errors
    /// Returns `ModelError::Json` on malformed input and `ModelError::InvalidConfig` if the
    /// values fail validation.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Epsilons for the bucket classifier.
    #[must_use]
    pub const fn classify_config(&self) -> ClassifyConfig {
        ClassifyConfig {
            book_to_market_epsilon: self.book_to_market_epsilon,
            market_cap_epsilon: self.market_cap_epsilon,
        }
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: &str| Err(ModelError::InvalidConfig(msg.to_string()));

        if self.market_proxies.is_empty() {
            return invalid("market_proxies must not be empty");
        }
        if self.risk_free_lookback == 0 {
            return invalid("risk_free_lookback must be positive");
        }
        if self.min_observations < 4 {
            return invalid("min_observations must be at least 4 for a three-factor fit");
        }
        if let Some(ceiling) = self.volatility_ceiling
            && !(ceiling.is_finite() && ceiling > 0.0)
        {
            return invalid("volatility_ceiling must be positive");
        }
        if !(self.investment_amount.is_finite() && self.investment_amount > 0.0) {
            return invalid("investment_amount must be positive");
        }
        if self.ranking.top_k == 0 {
            return invalid("ranking.top_k must be positive");
        }
        if !(self.ranking.outlier_std.is_finite() && self.ranking.outlier_std > 0.0) {
            return invalid("ranking.outlier_std must be positive");
        }
        if self.ranking.rsquared_weight < 0.0 || self.ranking.alpha_weight < 0.0 {
            return invalid("ranking weights must be non-negative");
        }
        if self.equal_weight.topx == 0 {
            return invalid("equal_weight.topx must be positive");
        }
        if !(self.equal_weight.budget > 0.0 && self.equal_weight.price_ceiling > 0.0) {
            return invalid("equal_weight budget and price_ceiling must be positive");
        }
        Ok(())
    }
}
