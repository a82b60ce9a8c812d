//! Monthly log of pages that did not yield a price.

use crate::ledger::LedgerError;
use crate::store::ProductResult;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

/// One failed extraction, tagged with the run date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub product_name: String,
    pub price: f64,
    pub source_url: String,
    pub date: String,
}

/// Append-only rows of failures. Never merged or deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
}

impl ErrorLog {
    /// Tags each failure with `date`.
    pub fn from_failures(failed: &[ProductResult], date: &str) -> Self {
        let records = failed
            .iter()
            .map(|r| ErrorRecord {
                product_name: r.name.clone(),
                price: r.price,
                source_url: r.source_url.clone(),
                date: date.to_string(),
            })
            .collect();

        Self { records }
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reads every row of an existing log.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        let csv_err = |source| LedgerError::Csv { path: path.to_path_buf(), source };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

        let records = reader
            .deserialize::<ErrorRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(csv_err)?;

        Ok(Self { records })
    }

    /// Concatenates these rows onto the log at `path`, creating it if needed.
    ///
    /// Does not touch the file when there is nothing to append.
    pub fn append_to(&self, path: &Path) -> Result<(), LedgerError> {
        if self.is_empty() {
            return Ok(());
        }

        // A missing or zero-length file still needs the header
        let is_new = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LedgerError::Io { path: path.to_path_buf(), source })?;

        let csv_err = |source| LedgerError::Csv { path: path.to_path_buf(), source };
        let mut writer = csv::WriterBuilder::new().has_headers(is_new).from_writer(file);
        for record in &self.records {
            writer.serialize(record).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| LedgerError::Io { path: path.to_path_buf(), source })?;

        debug!("Appended {} rows to {}", self.len(), path.display());
        Ok(())
    }
}
