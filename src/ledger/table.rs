//! Monthly wide price table: one row per product name, one column per scraped day.

use crate::ledger::LedgerError;
use crate::store::ProductResult;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Header of the identity column.
pub const KEY_COLUMN: &str = "product_name";

/// A product's prices across the month's day columns. `None` is a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub name: String,
    pub cells: Vec<Option<f64>>,
}

/// Wide table keyed by exact, case-sensitive product name.
///
/// Every row has exactly one cell per column. Rows keep their first-seen
/// order; columns keep insertion order with the latest day rightmost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyPriceTable {
    columns: Vec<String>,
    rows: Vec<PriceRow>,
    index: HashMap<String, usize>,
}

impl MonthlyPriceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Date column names, oldest first.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn row_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.name.as_str())
    }

    /// Number of product rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell for `name` in `column`; `None` for a hole or unknown key.
    pub fn price(&self, name: &str, column: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == column)?;
        let row = self.index.get(name)?;
        self.rows[*row].cells[col]
    }

    /// Merges one day's priced results as column `column`.
    ///
    /// Full outer merge on product name: rows missing today keep their
    /// history and get a hole, new names are appended. An existing column with
    /// the same name is dropped first, so a re-run replaces the day's prices
    /// and the column always ends up rightmost.
    pub fn merge_day(&mut self, column: &str, results: &[ProductResult]) {
        if let Some(pos) = self.columns.iter().position(|c| c == column) {
            debug!("Replacing existing column {}", column);
            self.columns.remove(pos);
            for row in &mut self.rows {
                row.cells.remove(pos);
            }
        }

        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.cells.push(None);
        }
        let day = self.columns.len() - 1;

        for result in results {
            let row = self.row_index(&result.name);
            if let Some(previous) = self.rows[row].cells[day].replace(result.price) {
                warn!(
                    "Duplicate product name {:?} on {}: {:.2} replaced by {:.2}",
                    result.name, column, previous, result.price
                );
            }
        }
    }

    /// Finds or appends the row for `name`.
    fn row_index(&mut self, name: &str) -> usize {
        if let Some(&row) = self.index.get(name) {
            return row;
        }

        let row = self.rows.len();
        self.rows.push(PriceRow { name: name.to_string(), cells: vec![None; self.columns.len()] });
        self.index.insert(name.to_string(), row);
        row
    }

    /// Reads a table from CSV: `product_name` followed by one column per day.
    pub fn load(path: &Path) -> Result<Self, LedgerError> {
        debug!("Loading price table: {}", path.display());

        let csv_err = |source| LedgerError::Csv { path: path.to_path_buf(), source };
        let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;

        let headers = reader.headers().map_err(csv_err)?.clone();
        let mut header_iter = headers.iter();
        if header_iter.next() != Some(KEY_COLUMN) {
            return Err(LedgerError::MissingKeyColumn { path: path.to_path_buf() });
        }

        let mut table = Self { columns: header_iter.map(String::from).collect(), ..Self::new() };

        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let name = record.get(0).unwrap_or_default();

            let mut cells = Vec::with_capacity(table.columns.len());
            for (offset, column) in table.columns.iter().enumerate() {
                let raw = record.get(offset + 1).unwrap_or_default().trim();
                let cell = if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse::<f64>().map_err(|_| LedgerError::InvalidCell {
                        path: path.to_path_buf(),
                        name: name.to_string(),
                        column: column.clone(),
                        value: raw.to_string(),
                    })?)
                };
                cells.push(cell);
            }

            let row = table.row_index(name);
            for (slot, cell) in table.rows[row].cells.iter_mut().zip(cells) {
                if cell.is_some() {
                    *slot = cell;
                }
            }
        }

        debug!("Loaded {} products x {} days", table.len(), table.columns.len());
        Ok(table)
    }

    /// Writes the whole table, replacing any previous file.
    ///
    /// Rows go to a sibling temp file first which is then renamed over `path`.
    pub fn save(&self, path: &Path) -> Result<(), LedgerError> {
        let tmp = path.with_extension("csv.tmp");
        let csv_err = |source| LedgerError::Csv { path: tmp.clone(), source };

        {
            let mut writer = csv::Writer::from_path(&tmp).map_err(csv_err)?;

            let mut header = Vec::with_capacity(self.columns.len() + 1);
            header.push(KEY_COLUMN);
            header.extend(self.columns.iter().map(String::as_str));
            writer.write_record(&header).map_err(csv_err)?;

            for row in &self.rows {
                let mut record = Vec::with_capacity(row.cells.len() + 1);
                record.push(row.name.clone());
                record.extend(row.cells.iter().map(|c| c.map(|p| p.to_string()).unwrap_or_default()));
                writer.write_record(&record).map_err(csv_err)?;
            }

            writer.flush().map_err(|source| LedgerError::Io { path: tmp.clone(), source })?;
        }

        std::fs::rename(&tmp, path)
            .map_err(|source| LedgerError::Io { path: path.to_path_buf(), source })?;

        debug!("Wrote {} products x {} days to {}", self.len(), self.columns.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn priced(name: &str, price: f64) -> ProductResult {
        ProductResult::new(name, price, format!("https://store.example/{}", name))
    }

    #[test]
    fn test_first_day_creates_rows_and_column() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 22.90)]);

        assert_eq!(table.columns(), ["Preço_20240501"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.price("Rice", "Preço_20240501"), Some(22.90));
    }

    #[test]
    fn test_second_day_outer_merge() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 22.90)]);
        table.merge_day("Preço_20240502", &[priced("Rice", 23.50), priced("Beans", 8.00)]);

        assert_eq!(table.columns(), ["Preço_20240501", "Preço_20240502"]);
        assert_eq!(table.row_names().collect::<Vec<_>>(), ["Rice", "Beans"]);
        assert_eq!(table.price("Rice", "Preço_20240501"), Some(22.90));
        assert_eq!(table.price("Rice", "Preço_20240502"), Some(23.50));
        assert_eq!(table.price("Beans", "Preço_20240501"), None);
        assert_eq!(table.price("Beans", "Preço_20240502"), Some(8.00));
    }

    #[test]
    fn test_absent_product_keeps_history_with_hole() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 22.90), priced("Milk", 4.79)]);
        table.merge_day("Preço_20240502", &[priced("Rice", 23.00)]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.price("Milk", "Preço_20240501"), Some(4.79));
        assert_eq!(table.price("Milk", "Preço_20240502"), None);
        assert_eq!(table.rows()[1].cells, vec![Some(4.79), None]);
    }

    #[test]
    fn test_same_day_rerun_replaces_column() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 22.90)]);
        table.merge_day("Preço_20240502", &[priced("Rice", 23.50), priced("Beans", 8.00)]);
        table.merge_day("Preço_20240502", &[priced("Rice", 24.00)]);

        assert_eq!(table.columns(), ["Preço_20240501", "Preço_20240502"]);
        assert_eq!(table.price("Rice", "Preço_20240502"), Some(24.00));
        assert_eq!(table.price("Beans", "Preço_20240502"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rerun_of_older_day_moves_column_rightmost() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 1.0)]);
        table.merge_day("Preço_20240502", &[priced("Rice", 2.0)]);
        table.merge_day("Preço_20240501", &[priced("Rice", 3.0)]);

        assert_eq!(table.columns(), ["Preço_20240502", "Preço_20240501"]);
        assert_eq!(table.price("Rice", "Preço_20240502"), Some(2.0));
        assert_eq!(table.price("Rice", "Preço_20240501"), Some(3.0));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("d1", &[priced("Rice", 1.0), priced("rice", 2.0)]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_name_same_day_last_wins() {
        let mut table = MonthlyPriceTable::new();
        table.merge_day("d1", &[priced("Rice", 1.0), priced("Rice", 2.0)]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.price("Rice", "d1"), Some(2.0));
    }

    #[test]
    fn test_save_and_load_preserves_holes_and_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("precos.csv");

        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 22.9), priced("Café, 500g", 19.99)]);
        table.merge_day("Preço_20240502", &[priced("Beans", 8.0)]);
        table.save(&path).unwrap();

        assert!(!path.with_extension("csv.tmp").exists());

        let loaded = MonthlyPriceTable::load(&path).unwrap();
        assert_eq!(loaded, table);
        assert_eq!(loaded.price("Café, 500g", "Preço_20240501"), Some(19.99));
        assert_eq!(loaded.price("Café, 500g", "Preço_20240502"), None);
    }

    #[test]
    fn test_saved_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("precos.csv");

        let mut table = MonthlyPriceTable::new();
        table.merge_day("Preço_20240501", &[priced("Rice", 22.9)]);
        table.merge_day("Preço_20240502", &[priced("Beans", 8.5)]);
        table.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "product_name,Preço_20240501,Preço_20240502");
        assert_eq!(lines[1], "Rice,22.9,");
        assert_eq!(lines[2], "Beans,,8.5");
    }

    #[test]
    fn test_load_missing_key_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "name,Preço_20240501\nRice,1.0\n").unwrap();

        let err = MonthlyPriceTable::load(&path).unwrap_err();
        assert!(matches!(err, LedgerError::MissingKeyColumn { .. }));
    }

    #[test]
    fn test_load_invalid_cell() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "product_name,Preço_20240501\nRice,abc\n").unwrap();

        let err = MonthlyPriceTable::load(&path).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MonthlyPriceTable::load(Path::new("/nonexistent/precos.csv")).unwrap_err();
        assert!(matches!(err, LedgerError::Csv { .. }));
    }
}
