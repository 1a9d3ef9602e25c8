//! # famafrench
//!
//! Fama-French three-factor stock ranking.
//!
//! Stocks are sorted into six size by book-to-market portfolios, daily market, SMB and HML
//! factor returns are built from those portfolios and a set of market proxies, every stock's
//! returns are regressed on the three factors, and the best alpha / R-squared trade-offs are
//! turned into a whole-share allocation.
//!
//! This crate re-exports the workspace components behind feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Source, sink and regressor abstractions
//! - `math`: OLS solver, statistics and rate conversion
//! - `utils`: Wide-table alignment, returns and gap filling
//! - `portfolios`: Size by book-to-market classification and bucket prices
//! - `model`: Factor returns, regression, ranking and the pipeline
//! - `io`: In-memory and CSV data sources, CSV result sink
//! - `cli`: The `famafrench` binary
//!
//! ## Example
//!
//! ```rust,ignore
//! use famafrench::{
//!     io::{CsvDirectorySource, CsvSink},
//!     model::{Pipeline, PipelineConfig},
//! };
//!
//! let source = CsvDirectorySource::new("data");
//! let output = Pipeline::new(PipelineConfig::default())?.run(&source, &source.universe()?)?;
//! output.write_to(&mut CsvSink::create("results")?)?;
//! ```

#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use famafrench_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use famafrench_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use famafrench_math as math;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use famafrench_utils as utils;
#[cfg(feature = "portfolios")]
#[doc(inline)]
pub use famafrench_portfolios as portfolios;
#[cfg(feature = "model")]
#[doc(inline)]
pub use famafrench_model as model;
#[cfg(feature = "io")]
#[doc(inline)]
pub use famafrench_io as io;
