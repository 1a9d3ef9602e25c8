//! Interest rate conversions.

/// Days per year used when de-annualizing rates.
pub const DAY_COUNT_BASIS: f64 = 360.0;

/// Convert an annual rate to the equivalent daily compounded rate:
/// `(1 + r)^(1/360) - 1`.
#[must_use]
pub fn yearly_to_daily(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / DAY_COUNT_BASIS) - 1.0
}

/// Convert a rate quoted in percent to a fraction.
#[must_use]
pub fn percent_to_fraction(rate: f64) -> f64 {
    rate / 100.0
}
