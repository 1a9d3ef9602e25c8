//! Sample statistics over return vectors.

use std::cmp::Ordering;

/// Trading days used to annualize daily volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), `None` with fewer than two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Annualized volatility of daily returns: `sample_std * sqrt(252)`.
#[must_use]
pub fn annualized_volatility(daily_returns: &[f64]) -> Option<f64> {
    sample_std(daily_returns).map(|s| s * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Round to `decimals` places, resolving exact ties to the even neighbour.
///
/// Ties are judged on the exact binary value of `value`, not on `value * 10^decimals`:
/// `2.675` is stored just below the tie, so it rounds to `2.67`.
#[must_use]
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    let scaled = value * scale;
    if decimals < 0 || !scaled.is_finite() || (scaled - scaled.trunc()).abs() != 0.5 {
        return scaled.round_ties_even() / scale;
    }
    // The product landed on a tie; the exact decimal expansion says which side it came from.
    match tail_vs_half(value, decimals.unsigned_abs() as usize) {
        Ordering::Less => scaled.trunc() / scale,
        Ordering::Greater => (scaled.trunc() + scaled.signum()) / scale,
        Ordering::Equal => scaled.round_ties_even() / scale,
    }
}

/// Compare the digits of `|value|` after the first `decimals` fractional places with one half.
fn tail_vs_half(value: f64, decimals: usize) -> Ordering {
    // Only reached with |value| >= 0.5 * 10^-decimals, which ends within this many digits.
    let exact = format!("{:.*}", 4 * decimals + 64, value.abs());
    let tail = exact.split_once('.').map_or("", |(_, frac)| &frac[decimals..]);
    let mut digits = tail.bytes();
    match digits.next() {
        Some(b'5') if digits.all(|d| d == b'0') => Ordering::Equal,
        Some(d) if d >= b'5' => Ordering::Greater,
        _ => Ordering::Less,
    }
}
