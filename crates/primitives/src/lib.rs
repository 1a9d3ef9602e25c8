#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod allocation;
pub use allocation::{Allocation, RankedCandidate, total_cost};

mod asset;
pub use asset::{AssetFundamental, Symbol};

mod bucket;
pub use bucket::{Bucket, BucketAssignment, SizeLeg, ValueLeg};

mod diagnostic;
pub use diagnostic::{Diagnostic, DiagnosticKind};

mod error;
pub use error::SeriesError;

mod factor;
pub use factor::{DATE_COLUMN, Factor, FactorObservation, MARKET_COLUMN, RISK_FREE_COLUMN};

mod regression;
pub use regression::RegressionResult;

mod series;
pub use series::{PriceSeries, RateSeries, TimeSeries};

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
