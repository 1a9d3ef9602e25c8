#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod source;
pub use source::{MarketDataSource, SourceError};

mod sink;
pub use sink::ResultSink;

mod estimator;
pub use estimator::{EstimatorError, FactorRegressor};
