//! Factor-related type definitions.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Date;

/// Name of the date index column in every wide table.
pub const DATE_COLUMN: &str = "date";

/// Name of the summed market-proxy price/return column.
pub const MARKET_COLUMN: &str = "market";

/// Name of the daily risk-free rate column.
pub const RISK_FREE_COLUMN: &str = "risk_free_rate";

/// One of the three explanatory factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Factor {
    /// Market return in excess of the risk-free rate.
    #[display("excess_return")]
    ExcessReturn,
    /// Small minus big.
    #[display("SMB")]
    Smb,
    /// High minus low book-to-market.
    #[display("HML")]
    Hml,
}

impl Factor {
    /// All factors in regression column order.
    pub const ALL: [Self; 3] = [Self::ExcessReturn, Self::Smb, Self::Hml];

    /// Column name used for this factor in factor tables.
    #[must_use]
    pub const fn column(&self) -> &'static str {
        match self {
            Self::ExcessReturn => "excess_return",
            Self::Smb => "SMB",
            Self::Hml => "HML",
        }
    }
}

/// Factor returns for a single date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorObservation {
    /// Date of the returns.
    pub date: Date,
    /// Market excess return.
    pub excess_return: f64,
    /// Small-minus-big return.
    pub smb: f64,
    /// High-minus-low return.
    pub hml: f64,
}

impl FactorObservation {
    /// Create a new observation.
    #[must_use]
    pub const fn new(date: Date, excess_return: f64, smb: f64, hml: f64) -> Self {
        Self { date, excess_return, smb, hml }
    }

    /// Get the return for a specific factor.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::ExcessReturn => self.excess_return,
            Factor::Smb => self.smb,
            Factor::Hml => self.hml,
        }
    }
}
