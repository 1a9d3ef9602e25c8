//! Synthetic bucket prices.

use std::collections::BTreeSet;

use famafrench_primitives::{Bucket, BucketAssignment, Symbol};
use famafrench_utils::column_values;
use polars::prelude::*;
use tracing::debug;

use crate::PortfolioError;

/// Price of holding one share of every symbol in `symbols`, per row of `prices`.
///
/// Symbols without a column in `prices` are skipped. A missing cell in any member makes the
/// row's sum missing. With no matching column the result is a zero series over the table's rows.
///
/// # Errors
/// Returns an error if a matching column is not numeric.
pub fn synthetic_price(
    symbols: &BTreeSet<Symbol>,
    prices: &DataFrame,
) -> Result<Vec<Option<f64>>, PortfolioError> {
    let mut total = vec![Some(0.0); prices.height()];
    let mut matched = 0_usize;

    for symbol in symbols {
        if prices.column(symbol.as_str()).is_err() {
            continue;
        }
        let values = column_values(prices, symbol.as_str())?;
        for (acc, v) in total.iter_mut().zip(values) {
            *acc = acc.zip(v).map(|(a, b)| a + b);
        }
        matched += 1;
    }

    debug!(requested = symbols.len(), matched, "synthetic price");
    Ok(total)
}

/// Append the six bucket price columns (`sg`, `sn`, `sv`, `bg`, `bn`, `bv`) to a price table.
/// Existing columns with those names are replaced.
///
/// # Errors
/// Returns an error if a member column is not numeric.
pub fn with_bucket_prices(
    prices: &DataFrame,
    assignment: &BucketAssignment,
) -> Result<DataFrame, PortfolioError> {
    let mut out = prices.clone();
    for bucket in Bucket::ALL {
        let values = synthetic_price(assignment.get(bucket), prices)?;
        out.with_column(Series::new(bucket.column().into(), values))?;
    }
    Ok(out)
}
