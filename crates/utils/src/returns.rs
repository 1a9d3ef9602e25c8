//! Percentage return computation.

use famafrench_primitives::DATE_COLUMN;
use polars::prelude::*;

use crate::{UtilsError, value_columns};

/// Date-over-date percentage change of one column.
///
/// Prices are padded forward before differencing, so a gap contributes a zero return on the
/// gap day and the full move on the next observed day. Non-finite results (division by a
/// zero price) become null.
#[must_use]
pub fn pct_change(name: &str) -> Expr {
    let padded = col(name).forward_fill(None);
    let change = padded.clone() / padded.shift(lit(1)) - lit(1.0);
    when(change.clone().is_finite())
        .then(change)
        .otherwise(lit(NULL).cast(DataType::Float64))
        .alias(name)
}

/// Percentage returns of every value column. The first row, which has no predecessor,
/// is dropped.
///
/// # Errors
/// Returns an error if the frame has no `date` column or a column is not numeric.
pub fn percentage_returns(prices: &DataFrame) -> Result<DataFrame, UtilsError> {
    if prices.column(DATE_COLUMN).is_err() {
        return Err(UtilsError::MissingColumn(DATE_COLUMN.to_string()));
    }
    let exprs: Vec<Expr> = value_columns(prices).iter().map(|name| pct_change(name)).collect();

    let returns = prices
        .clone()
        .lazy()
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .with_columns(exprs)
        .slice(1, IdxSize::MAX)
        .collect()?;
    Ok(returns)
}
