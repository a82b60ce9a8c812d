//! Prints a month's price table.

use crate::config::Config;
use crate::format::Formatter;
use crate::ledger::{Ledger, RunContext};
use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Reads and formats the persisted table for one month.
pub struct ShowCommand {
    config: Config,
}

impl ShowCommand {
    /// Creates a new show command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Formats the table for `month` (`YYYY-MM`), or the current month.
    pub fn execute(&self, month: Option<&str>) -> Result<String> {
        let ctx = match month {
            Some(month) => RunContext::new(&self.config.data_dir, &self.config.store, parse_month(month)?),
            None => RunContext::today(&self.config.data_dir, &self.config.store),
        };

        let ledger = Ledger::new(ctx);
        let path = ledger.context().price_table_path();

        match ledger.load_table().context("Failed to read price table")? {
            Some(table) => Ok(Formatter::new(self.config.format).format_table(&table)),
            None => Ok(format!("No price table for {} ({})", ledger.context().month_stamp(), path.display())),
        }
    }
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month: '{}'. Expected YYYY-MM.", month))
}
