//! Outer-join alignment of per-symbol price series.

use std::collections::{BTreeSet, HashSet};

use famafrench_primitives::{Date, Diagnostic, DiagnosticKind, PriceSeries, Symbol};
use polars::prelude::DataFrame;
use tracing::{debug, warn};

use crate::{UtilsError, frame_from_columns};

/// Wide price table plus the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct AlignedPrices {
    /// `date` column followed by one price column per surviving symbol.
    pub frame: DataFrame,
    /// Symbols in column order.
    pub symbols: Vec<Symbol>,
    /// Skipped, duplicated and pruned series.
    pub diagnostics: Vec<Diagnostic>,
}

/// Merge per-symbol price series into one date-indexed table.
///
/// Rows are the union of all dates. Cells for dates a symbol lacks are null. Any column with
/// more than `max_missing` null cells is removed and reported. Empty series are skipped, and
/// when the same symbol appears more than once the first non-empty series wins.
///
/// # Errors
/// Returns an error if the frame cannot be assembled.
pub fn align_series(
    series: Vec<(Symbol, PriceSeries)>,
    max_missing: usize,
) -> Result<AlignedPrices, UtilsError> {
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(series.len());

    for (symbol, prices) in series {
        if prices.is_empty() {
            warn!(%symbol, "empty price series, skipping");
            diagnostics.push(Diagnostic::new(
                symbol,
                DiagnosticKind::MissingData,
                "price series is empty",
            ));
            continue;
        }
        if !seen.insert(symbol.clone()) {
            warn!(%symbol, "duplicate price series, keeping the first");
            diagnostics.push(Diagnostic::new(
                symbol,
                DiagnosticKind::DuplicateSource,
                "symbol supplied more than once",
            ));
            continue;
        }
        kept.push((symbol, prices));
    }

    let dates: Vec<Date> =
        kept.iter().flat_map(|(_, s)| s.dates()).collect::<BTreeSet<_>>().into_iter().collect();

    let mut symbols = Vec::with_capacity(kept.len());
    let mut columns = Vec::with_capacity(kept.len());
    for (symbol, prices) in kept {
        let values: Vec<Option<f64>> = dates.iter().map(|d| prices.get(d)).collect();
        let missing = values.iter().filter(|v| v.is_none()).count();
        if missing > max_missing {
            warn!(%symbol, missing, max_missing, "too many missing prices, dropping column");
            diagnostics.push(Diagnostic::new(
                symbol,
                DiagnosticKind::SparseSeries,
                format!("{missing} missing prices exceeds limit of {max_missing}"),
            ));
            continue;
        }
        columns.push((symbol.as_str().to_string(), values));
        symbols.push(symbol);
    }

    debug!(rows = dates.len(), columns = symbols.len(), "aligned price table");
    let frame = frame_from_columns(&dates, columns)?;
    Ok(AlignedPrices { frame, symbols, diagnostics })
}
