//! Gap filling for factor tables.

use polars::prelude::*;

use crate::{UtilsError, value_columns};

/// Fill gaps forward only, then drop rows that still contain a gap.
///
/// Interior gaps are filled by linear interpolation on row position and trailing gaps carry
/// the last observed value forward. Leading gaps have nothing to fill from, so those rows are
/// removed.
///
/// # Errors
/// Returns an error if a column cannot be interpolated.
pub fn interpolate_forward(df: &DataFrame) -> Result<DataFrame, UtilsError> {
    let exprs: Vec<Expr> = value_columns(df)
        .iter()
        .map(|name| {
            col(name.as_str())
                .cast(DataType::Float64)
                .interpolate(InterpolationMethod::Linear)
                .forward_fill(None)
                .alias(name.as_str())
        })
        .collect();

    let filled = df.clone().lazy().with_columns(exprs).drop_nulls(None).collect()?;
    Ok(filled)
}
