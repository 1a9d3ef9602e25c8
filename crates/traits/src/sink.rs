//! Result sink trait definitions.

use famafrench_primitives::{Allocation, Diagnostic, RegressionResult};
use polars::prelude::DataFrame;

/// Destination for the tables a pipeline run produces.
pub trait ResultSink {
    /// Error type of the sink.
    type Error: std::error::Error;

    /// Write the final allocation table.
    ///
    /// # Errors
    /// Returns the sink's error if the table cannot be written.
    fn write_allocation(&mut self, allocations: &[Allocation]) -> Result<(), Self::Error>;

    /// Write per-symbol regression results. Row order carries no meaning.
    ///
    /// # Errors
    /// Returns the sink's error if the table cannot be written.
    fn write_regressions(&mut self, results: &[RegressionResult]) -> Result<(), Self::Error>;

    /// Write excluded and warned symbols with their reasons.
    ///
    /// # Errors
    /// Returns the sink's error if the table cannot be written.
    fn write_excluded(&mut self, diagnostics: &[Diagnostic]) -> Result<(), Self::Error>;

    /// Write the date-indexed factor table.
    ///
    /// # Errors
    /// Returns the sink's error if the table cannot be written.
    fn write_factors(&mut self, factors: &DataFrame) -> Result<(), Self::Error>;
}
