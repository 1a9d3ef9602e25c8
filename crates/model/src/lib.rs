#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{EqualWeightConfig, PipelineConfig, RankingConfig};

mod factor_returns;
pub use factor_returns::{
    FactorConfig, FactorReturnsBuilder, FactorTable, hml_expr, reserved_columns, smb_expr,
};

mod regression;
pub use regression::{OlsConfig, OlsFactorRegressor, RegressionEngine, RegressionOutcome};

mod ranking;
pub use ranking::{
    AllocationOutcome, EqualWeightPlan, RankingOutcome, allocate, alpha_leaders,
    equal_weight_shortlist, rank_and_select,
};

mod pipeline;
pub use pipeline::{Pipeline, PipelineOutput, PreparedData};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use famafrench_traits::{FactorRegressor, MarketDataSource, ResultSink};

    pub use super::{
        FactorTable, ModelError, OlsFactorRegressor, Pipeline, PipelineConfig, PipelineOutput,
        RegressionEngine,
    };
}
