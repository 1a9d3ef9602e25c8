//! Asset type definitions.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Separator some providers use for exchange share classes (`BRK/B`).
const CLASS_SEPARATOR_ALIAS: char = '/';

/// Canonical share-class separator (`BRK.B`).
const CLASS_SEPARATOR: char = '.';

/// Stock ticker symbol.
///
/// Symbols are normalized on construction: surrounding whitespace is trimmed, letters are
/// upper-cased and the `/` share-class separator is rewritten to `.`, so `brk/b` and `BRK.B`
/// refer to the same column everywhere in the pipeline.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol, normalizing it to canonical form.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(normalize(s.as_ref()))
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_uppercase().replace(CLASS_SEPARATOR_ALIAS, &CLASS_SEPARATOR.to_string())
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fundamental snapshot for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFundamental {
    /// Ticker symbol (unique key).
    pub symbol: Symbol,
    /// Market capitalization.
    pub market_cap: f64,
    /// Book value per share.
    pub book_value_per_share: f64,
    /// Shares outstanding.
    pub shares_outstanding: f64,
}

impl AssetFundamental {
    /// Create a new fundamental record.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        market_cap: f64,
        book_value_per_share: f64,
        shares_outstanding: f64,
    ) -> Self {
        Self { symbol, market_cap, book_value_per_share, shares_outstanding }
    }

    /// Book equity: book value per share times shares outstanding.
    #[must_use]
    pub fn equity(&self) -> f64 {
        self.book_value_per_share * self.shares_outstanding
    }

    /// Book-to-market ratio, or `None` when market cap is zero or any input is non-finite.
    #[must_use]
    pub fn book_to_market(&self) -> Option<f64> {
        if !self.is_finite() || self.market_cap.abs() <= f64::EPSILON {
            return None;
        }
        let ratio = self.equity() / self.market_cap;
        ratio.is_finite().then_some(ratio)
    }

    /// Whether every numeric field is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.market_cap.is_finite()
            && self.book_value_per_share.is_finite()
            && self.shares_outstanding.is_finite()
    }
}
