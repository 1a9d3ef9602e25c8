//! In-memory market data source.

use std::collections::HashMap;

use famafrench_primitives::{AssetFundamental, PriceSeries, RateSeries, Symbol};
use famafrench_traits::{MarketDataSource, SourceError};

/// A [`MarketDataSource`] backed by maps, filled through builder methods.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    fundamentals: Vec<AssetFundamental>,
    prices: HashMap<Symbol, PriceSeries>,
    proxies: HashMap<String, PriceSeries>,
    risk_free: Option<RateSeries>,
}

impl InMemorySource {
    /// Create an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one fundamental record, replacing any earlier record for the same symbol.
    #[must_use]
    pub fn with_fundamental(mut self, fundamental: AssetFundamental) -> Self {
        self.insert_fundamental(fundamental);
        self
    }

    /// Add many fundamental records.
    #[must_use]
    pub fn with_fundamentals(
        mut self,
        fundamentals: impl IntoIterator<Item = AssetFundamental>,
    ) -> Self {
        for f in fundamentals {
            self.insert_fundamental(f);
        }
        self
    }

    /// Set a symbol's price history.
    #[must_use]
    pub fn with_prices(mut self, symbol: impl Into<Symbol>, prices: PriceSeries) -> Self {
        self.prices.insert(symbol.into(), prices);
        self
    }

    /// Set a market proxy's price history.
    #[must_use]
    pub fn with_proxy(mut self, name: impl Into<String>, prices: PriceSeries) -> Self {
        self.proxies.insert(name.into(), prices);
        self
    }

    /// Set the annualized risk-free series.
    #[must_use]
    pub fn with_risk_free(mut self, rates: RateSeries) -> Self {
        self.risk_free = Some(rates);
        self
    }

    /// Add or replace a fundamental record in place.
    pub fn insert_fundamental(&mut self, fundamental: AssetFundamental) {
        match self.fundamentals.iter_mut().find(|f| f.symbol == fundamental.symbol) {
            Some(existing) => *existing = fundamental,
            None => self.fundamentals.push(fundamental),
        }
    }

    /// Set a symbol's price history in place.
    pub fn insert_prices(&mut self, symbol: Symbol, prices: PriceSeries) {
        self.prices.insert(symbol, prices);
    }

    /// Symbols with fundamentals, in insertion order.
    #[must_use]
    pub fn universe(&self) -> Vec<Symbol> {
        self.fundamentals.iter().map(|f| f.symbol.clone()).collect()
    }
}

impl MarketDataSource for InMemorySource {
    fn fundamentals(&self, universe: &[Symbol]) -> Result<Vec<AssetFundamental>, SourceError> {
        Ok(self.fundamentals.iter().filter(|f| universe.contains(&f.symbol)).cloned().collect())
    }

    fn price_series(&self, symbol: &Symbol) -> Result<Option<PriceSeries>, SourceError> {
        Ok(self.prices.get(symbol).filter(|p| !p.is_empty()).cloned())
    }

    fn risk_free_rates(&self) -> Result<RateSeries, SourceError> {
        self.risk_free.clone().ok_or_else(|| SourceError::NotFound("risk-free rates".to_string()))
    }

    fn market_proxy_series(&self, name: &str) -> Result<PriceSeries, SourceError> {
        self.proxies.get(name).cloned().ok_or_else(|| SourceError::NotFound(name.to_string()))
    }
}
