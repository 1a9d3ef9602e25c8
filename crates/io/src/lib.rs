#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod csv_source;
pub use csv_source::{
    CsvDirectorySource, FUNDAMENTALS_FILE, PRICES_DIR, RISK_FREE_FILE, read_dated_csv,
};

mod memory;
pub use memory::InMemorySource;

mod sink;
pub use sink::{ALLOCATION_FILE, CsvSink, EXCLUDED_FILE, FACTORS_FILE, REGRESSIONS_FILE};

mod error;
pub use error::IoError;
