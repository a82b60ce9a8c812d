//! Product URL lists.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Built-in list of product pages, visited in order.
const DEFAULT_URL_LIST: &str = include_str!("../../urls.txt");

/// Returns the built-in URL list.
pub fn default_urls() -> Vec<String> {
    parse_url_list(DEFAULT_URL_LIST)
}

/// Parses a URL list: one URL per line, `#` comments and blank lines ignored.
///
/// Order and duplicates are preserved; every entry is one page visit.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Loads a URL list from a file.
pub fn load_url_file(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    debug!("Loading URL list from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list: {}", path.display()))?;

    Ok(parse_url_list(&content))
}
