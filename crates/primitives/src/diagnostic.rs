//! Run diagnostics for excluded or warned symbols.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Why a symbol was excluded or flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Price or fundamental lookup absent or invalid.
    #[display("missing_data")]
    MissingData,
    /// Same symbol supplied more than once; the first non-empty series was kept.
    #[display("duplicate_source")]
    DuplicateSource,
    /// Series dropped for exceeding the missing-value limit.
    #[display("sparse_series")]
    SparseSeries,
    /// Too few observations for a stable regression.
    #[display("insufficient_history")]
    InsufficientHistory,
    /// Zero-variance outcome or singular design.
    #[display("degenerate_fit")]
    DegenerateFit,
    /// Annualized volatility above the configured ceiling.
    #[display("volatility_screen")]
    VolatilityScreen,
    /// Alpha too far from the cross-sectional mean.
    #[display("outlier")]
    Outlier,
}

/// One excluded or warned symbol with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Affected symbol (or series name).
    pub symbol: Symbol,
    /// Category.
    pub kind: DiagnosticKind,
    /// Human readable detail.
    pub reason: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    #[must_use]
    pub fn new(symbol: Symbol, kind: DiagnosticKind, reason: impl Into<String>) -> Self {
        Self { symbol, kind, reason: reason.into() }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.symbol, self.kind, self.reason)
    }
}
