//! Date-indexed frame helpers.

use chrono::{Datelike, NaiveDate};
use famafrench_primitives::{DATE_COLUMN, Date};
use polars::prelude::*;

use crate::UtilsError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01, the polars `Date` epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn to_epoch_days(date: &Date) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Build the `date` column from calendar dates.
///
/// # Errors
/// Returns an error if the cast to `Date` fails.
pub fn date_series(dates: &[Date]) -> Result<Column, UtilsError> {
    let days: Vec<i32> = dates.iter().map(to_epoch_days).collect();
    let series = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;
    Ok(series.into())
}

/// Read the `date` column back into calendar dates.
///
/// # Errors
/// Returns an error if the column is missing, null, or out of range.
pub fn date_column(df: &DataFrame) -> Result<Vec<Date>, UtilsError> {
    let days = df
        .column(DATE_COLUMN)
        .map_err(|_| UtilsError::MissingColumn(DATE_COLUMN.to_string()))?
        .cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .map(|d| {
            let d = d.ok_or_else(|| UtilsError::InvalidParameter("null date".to_string()))?;
            NaiveDate::from_num_days_from_ce_opt(d + EPOCH_DAYS_FROM_CE)
                .ok_or(UtilsError::InvalidDate(d))
        })
        .collect()
}

/// Names of every non-date column, in frame order.
#[must_use]
pub fn value_columns(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != DATE_COLUMN)
        .map(|name| name.to_string())
        .collect()
}

/// Values of one numeric column as `f64`, nulls preserved.
///
/// # Errors
/// Returns `UtilsError::MissingColumn` if the column does not exist.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    let column = df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))?;
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Assemble a frame from a date index and named value columns.
///
/// # Errors
/// Returns an error if a column length differs from the index length.
pub fn frame_from_columns<I, S>(dates: &[Date], columns: I) -> Result<DataFrame, UtilsError>
where
    I: IntoIterator<Item = (S, Vec<Option<f64>>)>,
    S: AsRef<str>,
{
    let mut out = vec![date_series(dates)?];
    for (name, values) in columns {
        if values.len() != dates.len() {
            return Err(UtilsError::InvalidParameter(format!(
                "column {} has {} rows, index has {}",
                name.as_ref(),
                values.len(),
                dates.len()
            )));
        }
        out.push(Series::new(name.as_ref().into(), values).into());
    }
    Ok(DataFrame::new(out)?)
}

/// Outer join two date-indexed frames, coalescing the date key and sorting by it.
///
/// # Errors
/// Returns a polars error if either frame lacks a `date` column.
pub fn full_join_on_date(left: &DataFrame, right: &DataFrame) -> Result<DataFrame, UtilsError> {
    let joined = left
        .clone()
        .lazy()
        .join(
            right.clone().lazy(),
            [col(DATE_COLUMN)],
            [col(DATE_COLUMN)],
            JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
        )
        .sort([DATE_COLUMN], SortMultipleOptions::default())
        .collect()?;
    Ok(joined)
}
