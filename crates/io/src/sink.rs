//! CSV result sink.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use famafrench_primitives::{Allocation, Diagnostic, RegressionResult};
use famafrench_traits::ResultSink;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use serde::Serialize;
use tracing::info;

use crate::IoError;

/// Allocation table file name.
pub const ALLOCATION_FILE: &str = "allocation.csv";

/// Regression table file name.
pub const REGRESSIONS_FILE: &str = "regressions.csv";

/// Excluded-symbol table file name.
pub const EXCLUDED_FILE: &str = "excluded.csv";

/// Factor table file name.
pub const FACTORS_FILE: &str = "factors.csv";

const ALLOCATION_HEADER: [&str; 6] =
    ["symbol", "shares", "unit_price", "subtotal", "rsquared", "alpha"];

const REGRESSIONS_HEADER: [&str; 7] =
    ["symbol", "alpha", "beta_market", "beta_smb", "beta_hml", "rsquared", "observations"];

const EXCLUDED_HEADER: [&str; 3] = ["symbol", "kind", "reason"];

#[derive(Debug, Serialize)]
struct ExcludedRow<'a> {
    symbol: &'a str,
    kind: String,
    reason: &'a str,
}

/// Writes each result table to its own CSV file in one directory.
///
/// Headers are written even when a table is empty.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Create a sink writing into `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns `IoError::Io` if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, IoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_table<T: Serialize>(
        &self,
        file: &str,
        header: &[&str],
        rows: impl IntoIterator<Item = T>,
    ) -> Result<(), IoError> {
        let path = self.dir.join(file);
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&path)?;
        writer.write_record(header)?;
        let mut count = 0_usize;
        for row in rows {
            writer.serialize(row)?;
            count += 1;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = count, "wrote table");
        Ok(())
    }
}

impl ResultSink for CsvSink {
    type Error = IoError;

    fn write_allocation(&mut self, allocations: &[Allocation]) -> Result<(), IoError> {
        self.write_table(ALLOCATION_FILE, &ALLOCATION_HEADER, allocations)
    }

    fn write_regressions(&mut self, results: &[RegressionResult]) -> Result<(), IoError> {
        self.write_table(REGRESSIONS_FILE, &REGRESSIONS_HEADER, results)
    }

    fn write_excluded(&mut self, diagnostics: &[Diagnostic]) -> Result<(), IoError> {
        let rows = diagnostics.iter().map(|d| ExcludedRow {
            symbol: d.symbol.as_str(),
            kind: d.kind.to_string(),
            reason: &d.reason,
        });
        self.write_table(EXCLUDED_FILE, &EXCLUDED_HEADER, rows)
    }

    fn write_factors(&mut self, factors: &DataFrame) -> Result<(), IoError> {
        let path = self.dir.join(FACTORS_FILE);
        let mut file = File::create(&path)?;
        let mut frame = factors.clone();
        CsvWriter::new(&mut file).include_header(true).finish(&mut frame)?;
        info!(path = %path.display(), rows = frame.height(), "wrote table");
        Ok(())
    }
}
