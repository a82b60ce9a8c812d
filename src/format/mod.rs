//! Output formatting for extraction results, run summaries, and monthly tables.

use crate::config::OutputFormat;
use crate::ledger::table::KEY_COLUMN;
use crate::ledger::{AccumulateReport, MonthlyPriceTable};
use crate::store::ProductResult;
use serde_json::json;

const NAME_WIDTH: usize = 50;

const RESULT_COLUMNS: [&str; 3] = ["product_name", "price", "source_url"];

/// Formats results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats extraction results.
    pub fn format_results(&self, results: &[ProductResult]) -> String {
        if results.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::to_csv(&RESULT_COLUMNS, Vec::<Vec<String>>::new()),
                _ => "No results.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_results(results),
            OutputFormat::Markdown => self.markdown_results(results),
            OutputFormat::Csv => self.csv_results(results),
        }
    }

    /// Formats the outcome of a `run`.
    pub fn format_report(&self, visited: usize, report: &AccumulateReport) -> String {
        let table_path = report.table_path.as_ref().map(|p| p.display().to_string());
        let error_path = report.error_log_path.as_ref().map(|p| p.display().to_string());

        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "visited": visited,
                    "priced": report.priced,
                    "failed": report.failed(),
                    "day_column": report.day_column,
                    "table_path": table_path,
                    "error_log_path": error_path,
                    "failures": report.errors.records(),
                });
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Csv => Self::to_csv(
                &["product_name", "price", "source_url", "date"],
                report.errors.records().iter().map(|r| {
                    [r.product_name.clone(), r.price.to_string(), r.source_url.clone(), r.date.clone()]
                }),
            ),
            OutputFormat::Table | OutputFormat::Markdown => {
                let bullet = if self.format == OutputFormat::Markdown { "- " } else { "" };
                let mut lines = vec![
                    format!("{}Visited: {} pages", bullet, visited),
                    format!("{}Priced:  {} ({})", bullet, report.priced, report.day_column),
                    format!("{}Failed:  {}", bullet, report.failed()),
                ];

                match &table_path {
                    Some(path) => lines.push(format!("{}Table:   {}", bullet, path)),
                    None => lines.push(format!("{}Table:   unchanged (no valid prices)", bullet)),
                }
                if let Some(path) = &error_path {
                    lines.push(format!("{}Errors:  {}", bullet, path));
                }

                for r in report.errors.records() {
                    lines.push(format!("{}  ✗ {} {}", bullet, r.product_name, r.source_url));
                }

                lines.join("\n")
            }
        }
    }

    /// Formats a monthly wide table.
    pub fn format_table(&self, table: &MonthlyPriceTable) -> String {
        let cell = |c: &Option<f64>| c.map(|p| format!("{:.2}", p)).unwrap_or_default();

        match self.format {
            OutputFormat::Json => {
                let rows: Vec<_> = table
                    .rows()
                    .iter()
                    .map(|row| {
                        let prices: serde_json::Map<_, _> = table
                            .columns()
                            .iter()
                            .zip(&row.cells)
                            .map(|(col, c)| (col.clone(), json!(c)))
                            .collect();
                        json!({ "product_name": row.name, "prices": prices })
                    })
                    .collect();
                serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Csv => {
                let mut header = vec![KEY_COLUMN];
                header.extend(table.columns().iter().map(String::as_str));

                let rows = table.rows().iter().map(|row| {
                    let mut fields = vec![row.name.clone()];
                    fields.extend(row.cells.iter().map(|c| c.map(|p| p.to_string()).unwrap_or_default()));
                    fields
                });
                Self::to_csv(&header, rows)
            }
            OutputFormat::Markdown => {
                let mut lines = Vec::new();
                lines.push(format!("| Product | {} |", table.columns().join(" | ")));
                lines.push(format!("|---|{}", "---:|".repeat(table.columns().len())));
                for row in table.rows() {
                    let cells: Vec<String> = row.cells.iter().map(cell).collect();
                    lines.push(format!("| {} | {} |", Self::markdown_escape(&row.name), cells.join(" | ")));
                }
                lines.push(String::new());
                lines.push(format!("*{} products, {} days*", table.len(), table.columns().len()));
                lines.join("\n")
            }
            OutputFormat::Table => {
                let name_width = NAME_WIDTH;
                let mut lines = Vec::new();
                let mut header = format!("{:<name_width$}", "Product");
                for col in table.columns() {
                    header.push_str(&format!("  {:>14}", col));
                }
                lines.push(header);
                lines.push("-".repeat(NAME_WIDTH + table.columns().len() * 16));

                for row in table.rows() {
                    let mut line = format!("{:<name_width$}", Self::truncate(&row.name, NAME_WIDTH));
                    for c in &row.cells {
                        line.push_str(&format!("  {:>14}", cell(c)));
                    }
                    lines.push(line);
                }

                lines.push(String::new());
                lines.push(format!("Total: {} products, {} days", table.len(), table.columns().len()));
                lines.join("\n")
            }
        }
    }

    // Table formatting

    fn table_results(&self, results: &[ProductResult]) -> String {
        let name_width = NAME_WIDTH;
        let price_width = 10;
        let mut lines = Vec::new();

        lines.push(format!("{:<name_width$}  {:>price_width$}  {}", "Product", "Price", "URL"));
        lines.push(format!("{:-<name_width$}  {:-<price_width$}  {:-<3}", "", "", ""));

        for r in results {
            let price = if r.is_priced() { format!("{:.2}", r.price) } else { "N/A".to_string() };
            lines.push(format!(
                "{:<name_width$}  {:>price_width$}  {}",
                Self::truncate(&r.name, NAME_WIDTH),
                price,
                r.source_url
            ));
        }

        let priced = results.iter().filter(|r| r.is_priced()).count();
        lines.push(String::new());
        lines.push(format!("Total: {} pages, {} priced", results.len(), priced));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_results(&self, results: &[ProductResult]) -> String {
        let mut lines = Vec::new();

        lines.push("| Product | Price |".to_string());
        lines.push("|---------|------:|".to_string());

        for r in results {
            let price = if r.is_priced() { format!("{:.2}", r.price) } else { "N/A".to_string() };
            lines.push(format!(
                "| [{}]({}) | {} |",
                Self::markdown_escape(&r.name),
                r.source_url,
                price
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} pages*", results.len()));

        lines.join("\n")
    }

    /// Escapes characters that would end a markdown table cell.
    fn markdown_escape(s: &str) -> String {
        s.replace('|', "\\|")
    }

    // CSV formatting

    fn csv_results(&self, results: &[ProductResult]) -> String {
        Self::to_csv(
            &RESULT_COLUMNS,
            results.iter().map(|r| [r.name.clone(), r.price.to_string(), r.source_url.clone()]),
        )
    }

    /// Writes a header and records through the csv writer, without a trailing newline.
    fn to_csv<I, R>(header: &[&str], rows: I) -> String
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator,
        R::Item: AsRef<[u8]>,
    {
        let write = || -> Result<Vec<u8>, csv::Error> {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(header)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.into_inner().map_err(|e| csv::Error::from(e.into_error()))
        };

        match write().map(String::from_utf8) {
            Ok(Ok(text)) => text.strip_suffix('\n').map(String::from).unwrap_or(text),
            _ => String::new(),
        }
    }

    fn truncate(s: &str, width: usize) -> String {
        if s.chars().count() > width {
            let head: String = s.chars().take(width - 3).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        }
    }
}
