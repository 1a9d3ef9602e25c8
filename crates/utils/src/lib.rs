#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/famafrench-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod align;
pub use align::{AlignedPrices, align_series};

mod fill;
pub use fill::interpolate_forward;

mod frame;
pub use frame::{
    column_values, date_column, date_series, frame_from_columns, full_join_on_date, value_columns,
};

mod returns;
pub use returns::{pct_change, percentage_returns};

mod error;
pub use error::UtilsError;
