//! Monthly persistence of scraped prices: the wide price table and the error log.

pub mod context;
pub mod errors;
pub mod table;

pub use context::RunContext;
pub use errors::{ErrorLog, ErrorRecord};
pub use table::MonthlyPriceTable;

use crate::store::ProductResult;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Storage-layer failures. These abort the run.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("CSV error in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no `{}` column", .path.display(), table::KEY_COLUMN)]
    MissingKeyColumn { path: PathBuf },

    #[error("{}: invalid price {value:?} for {name:?} in column {column}", .path.display())]
    InvalidCell { path: PathBuf, name: String, column: String, value: String },
}

/// Splits results into priced (`price > 0`) and failed (`price <= 0`).
pub fn partition(results: &[ProductResult]) -> (Vec<ProductResult>, Vec<ProductResult>) {
    results.iter().cloned().partition(ProductResult::is_priced)
}

/// What a single accumulation changed.
#[derive(Debug, Clone)]
pub struct AccumulateReport {
    /// Column written for this run's date
    pub day_column: String,
    /// Results merged into the price table
    pub priced: usize,
    /// Table as persisted; `None` when nothing was priced
    pub table: Option<MonthlyPriceTable>,
    /// Rows appended to the error log
    pub errors: ErrorLog,
    /// Files written by this run
    pub table_path: Option<PathBuf>,
    pub error_log_path: Option<PathBuf>,
}

impl AccumulateReport {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// Month-partitioned store for one run.
pub struct Ledger {
    ctx: RunContext,
}

impl Ledger {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Loads this month's price table, if any run has written one.
    pub fn load_table(&self) -> Result<Option<MonthlyPriceTable>, LedgerError> {
        let path = self.ctx.price_table_path();
        if !path.exists() {
            return Ok(None);
        }
        MonthlyPriceTable::load(&path).map(Some)
    }

    /// Loads this month's error log, if any.
    pub fn load_errors(&self) -> Result<Option<ErrorLog>, LedgerError> {
        let path = self.ctx.error_log_path();
        if !path.exists() {
            return Ok(None);
        }
        ErrorLog::load(&path).map(Some)
    }

    /// Merges today's results into the monthly files.
    ///
    /// Priced results are merged into the price table, which is rewritten in
    /// full. Failures are appended to the error log. A side with no rows
    /// leaves its file alone.
    pub fn accumulate(&self, results: &[ProductResult]) -> Result<AccumulateReport, LedgerError> {
        let (ok, failed) = partition(results);
        let day_column = self.ctx.day_column();

        let mut report = AccumulateReport {
            day_column: day_column.clone(),
            priced: ok.len(),
            table: None,
            errors: ErrorLog::from_failures(&failed, &self.ctx.date_label()),
            table_path: None,
            error_log_path: None,
        };

        if !ok.is_empty() || !failed.is_empty() {
            let dir = self.ctx.data_dir();
            std::fs::create_dir_all(dir)
                .map_err(|source| LedgerError::Io { path: dir.to_path_buf(), source })?;
        }

        if ok.is_empty() {
            warn!("No valid prices today; {} left unchanged", self.ctx.price_table_path().display());
        } else {
            let path = self.ctx.price_table_path();
            let mut table = self.load_table()?.unwrap_or_default();
            table.merge_day(&day_column, &ok);
            table.save(&path)?;

            info!("Updated {} (column {}, {} products)", path.display(), day_column, ok.len());
            report.table = Some(table);
            report.table_path = Some(path);
        }

        if report.errors.is_empty() {
            info!("No errors today");
        } else {
            let path = self.ctx.error_log_path();
            report.errors.append_to(&path)?;

            warn!("Saved {} failures to {}", report.errors.len(), path.display());
            report.error_log_path = Some(path);
        }

        Ok(report)
    }
}
