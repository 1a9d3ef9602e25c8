#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod classify;
pub use classify::{Breakpoints, BucketClassifier, Classification, ClassifyConfig};

mod synthetic;
pub use synthetic::{synthetic_price, with_bucket_prices};

mod error;
pub use error::PortfolioError;
