//! Error types for primitive construction.

use crate::Date;

/// Errors raised while building primitive values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    /// The same date appeared twice in one series.
    #[error("duplicate date {0} in series")]
    DuplicateDate(Date),

    /// A value was NaN or infinite.
    #[error("non-finite value on {0}")]
    NonFinite(Date),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let date = Date::from_ymd_opt(2019, 7, 21).unwrap();
        assert_eq!(
            SeriesError::DuplicateDate(date).to_string(),
            "duplicate date 2019-07-21 in series"
        );
    }
}
