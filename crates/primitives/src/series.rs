//! Dated series definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Date, SeriesError};

/// A date-keyed series of finite values, ascending and unique by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    points: BTreeMap<Date, f64>,
}

/// Closing prices for one symbol.
pub type PriceSeries = TimeSeries;

/// Annualized or daily rates keyed by date.
pub type RateSeries = TimeSeries;

impl TimeSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: BTreeMap::new() }
    }

    /// Build a series from `(date, value)` pairs.
    ///
    /// # Errors
    /// Returns `SeriesError::DuplicateDate` if a date repeats and `SeriesError::NonFinite`
    /// for NaN or infinite values.
    pub fn from_points(points: impl IntoIterator<Item = (Date, f64)>) -> Result<Self, SeriesError> {
        let mut series = Self::new();
        for (date, value) in points {
            series.insert(date, value)?;
        }
        Ok(series)
    }

    /// Insert one observation.
    ///
    /// # Errors
    /// Returns an error on a duplicate date or a non-finite value.
    pub fn insert(&mut self, date: Date, value: f64) -> Result<(), SeriesError> {
        if !value.is_finite() {
            return Err(SeriesError::NonFinite(date));
        }
        if self.points.insert(date, value).is_some() {
            return Err(SeriesError::DuplicateDate(date));
        }
        Ok(())
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value on a specific date.
    #[must_use]
    pub fn get(&self, date: &Date) -> Option<f64> {
        self.points.get(date).copied()
    }

    /// Iterate `(date, value)` pairs in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.points.keys().copied()
    }

    /// Most recent observation.
    #[must_use]
    pub fn last(&self) -> Option<(Date, f64)> {
        self.points.last_key_value().map(|(d, v)| (*d, *v))
    }

    /// Keep only the trailing `n` observations.
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let skip = self.points.len().saturating_sub(n);
        Self { points: self.points.iter().skip(skip).map(|(d, v)| (*d, *v)).collect() }
    }

    /// Apply `f` to every value, keeping dates.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self { points: self.points.iter().map(|(d, v)| (*d, f(*v))).collect() }
    }
}

impl FromIterator<(Date, f64)> for TimeSeries {
    /// Collect pairs, keeping the last value for a repeated date.
    fn from_iter<T: IntoIterator<Item = (Date, f64)>>(iter: T) -> Self {
        Self { points: iter.into_iter().collect() }
    }
}
