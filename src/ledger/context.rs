//! Per-invocation run context: date, month partition, and file locations.

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Prefix of the daily price column name.
pub const DAY_COLUMN_PREFIX: &str = "Preço_";

/// Everything date- or path-dependent about a run, fixed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    date: NaiveDate,
    data_dir: PathBuf,
    store: String,
}

impl RunContext {
    /// Creates a context for an explicit date.
    pub fn new(data_dir: impl Into<PathBuf>, store: impl Into<String>, date: NaiveDate) -> Self {
        Self { date, data_dir: data_dir.into(), store: store.into() }
    }

    /// Creates a context for the local calendar date.
    pub fn today(data_dir: impl Into<PathBuf>, store: impl Into<String>) -> Self {
        Self::new(data_dir, store, Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store(&self) -> &str {
        &self.store
    }

    /// `YYYY-MM`, identifies the monthly files.
    pub fn month_stamp(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// `YYYYMMDD`, suffix of the day column.
    pub fn day_stamp(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// `YYYY-MM-DD`, written to the error log.
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Name of today's price column, e.g. `Preço_20240501`.
    pub fn day_column(&self) -> String {
        format!("{}{}", DAY_COLUMN_PREFIX, self.day_stamp())
    }

    /// Monthly wide price table.
    pub fn price_table_path(&self) -> PathBuf {
        self.data_dir.join(format!("precos_{}_{}.csv", self.store, self.month_stamp()))
    }

    /// Monthly error log.
    pub fn error_log_path(&self) -> PathBuf {
        self.data_dir.join(format!("erros_{}_{}.csv", self.store, self.month_stamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(y: i32, m: u32, d: u32) -> RunContext {
        RunContext::new("data", "carrefour", NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_stamps() {
        let ctx = ctx(2024, 5, 1);
        assert_eq!(ctx.month_stamp(), "2024-05");
        assert_eq!(ctx.day_stamp(), "20240501");
        assert_eq!(ctx.date_label(), "2024-05-01");
        assert_eq!(ctx.day_column(), "Preço_20240501");
    }

    #[test]
    fn test_accessors() {
        let ctx = ctx(2024, 5, 1);
        assert_eq!(ctx.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(ctx.store(), "carrefour");
        assert_eq!(ctx.data_dir(), Path::new("data"));
    }

    #[test]
    fn test_paths() {
        let ctx = ctx(2024, 5, 31);
        assert_eq!(ctx.price_table_path(), Path::new("data/precos_carrefour_2024-05.csv"));
        assert_eq!(ctx.error_log_path(), Path::new("data/erros_carrefour_2024-05.csv"));
    }

    #[test]
    fn test_month_rollover_changes_files() {
        let may = ctx(2024, 5, 31);
        let june = ctx(2024, 6, 1);
        assert_ne!(may.price_table_path(), june.price_table_path());
        assert_ne!(may.error_log_path(), june.error_log_path());
    }

    #[test]
    fn test_same_month_shares_files() {
        assert_eq!(ctx(2024, 5, 1).price_table_path(), ctx(2024, 5, 20).price_table_path());
    }
}
