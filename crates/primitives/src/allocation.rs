//! Allocation type definitions.

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// A regression candidate that survived filtering, with its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Regression intercept.
    pub alpha: f64,
    /// Regression R-squared.
    pub rsquared: f64,
    /// Distance of alpha from the cross-sectional mean, in standard deviations.
    pub std_from_mean: Option<f64>,
    /// Weighted squared distance to the best R-squared and alpha (lower is better).
    pub objective: f64,
}

/// Position sizing for one selected symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Whole shares to buy.
    pub shares: u64,
    /// Latest available price.
    pub unit_price: f64,
    /// `shares * unit_price`.
    pub subtotal: f64,
    /// R-squared of the symbol's regression.
    pub rsquared: f64,
    /// Alpha of the symbol's regression.
    pub alpha: f64,
}

impl Allocation {
    /// Create an allocation, computing the subtotal.
    #[must_use]
    pub fn new(symbol: Symbol, shares: u64, unit_price: f64, rsquared: f64, alpha: f64) -> Self {
        let subtotal = shares as f64 * unit_price;
        Self { symbol, shares, unit_price, subtotal, rsquared, alpha }
    }
}

/// Sum of subtotals across allocations.
#[must_use]
pub fn total_cost(allocations: &[Allocation]) -> f64 {
    allocations.iter().map(|a| a.subtotal).sum()
}
