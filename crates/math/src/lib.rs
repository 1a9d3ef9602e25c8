#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linalg;
pub use linalg::{OlsResult, add_intercept, ordinary_least_squares, weighted_least_squares};

mod stats;
pub use stats::{TRADING_DAYS_PER_YEAR, annualized_volatility, mean, round_half_even, sample_std};

mod rates;
pub use rates::{DAY_COUNT_BASIS, percent_to_fraction, yearly_to_daily};

mod error;
pub use error::MathError;
