//! One-off extraction: render pages and print what would be recorded, without persisting.

use crate::commands::session;
use crate::config::Config;
use crate::format::Formatter;
use crate::store::PageRenderer;
use anyhow::Result;

/// Executes a dry extraction over explicit URLs.
pub struct ExtractCommand {
    config: Config,
}

impl ExtractCommand {
    /// Creates a new extract command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Extracts the given URLs with the configured engine and returns formatted output.
    pub async fn execute(&self, urls: &[String]) -> Result<String> {
        let results = session::scrape_with_config(&self.config, urls).await?;

        Ok(Formatter::new(self.config.format).format_results(&results))
    }

    /// Extracts with a provided renderer (for testing).
    pub async fn execute_with_renderer(
        &self,
        renderer: impl PageRenderer,
        urls: &[String],
    ) -> Result<String> {
        let results = session::scrape_urls(&self.config, renderer, urls).await;

        Ok(Formatter::new(self.config.format).format_results(&results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::session::tests::{make_test_config, product_page, MockPage, MockRenderer};
    use crate::config::OutputFormat;
    use crate::store::ProductResult;

    #[tokio::test]
    async fn test_extract_table_output() {
        let renderer = MockRenderer::new(vec![
            ("https://s/coffee", product_page("Café Melitta 500g", "19,99")),
            ("https://s/busca", MockPage::Html("<html></html>".to_string())),
        ]);

        let cmd = ExtractCommand::new(make_test_config());
        let urls = vec!["https://s/coffee".to_string(), "https://s/busca".to_string()];
        let output = cmd.execute_with_renderer(renderer, &urls).await.unwrap();

        assert!(output.contains("Café Melitta 500g"));
        assert!(output.contains("19.99"));
        assert!(output.contains("Total: 2 pages, 1 priced"));
    }

    #[tokio::test]
    async fn test_extract_json_output() {
        let renderer = MockRenderer::new(vec![("https://s/milk", product_page("Leite 1L", "4.79"))]);

        let mut config = make_test_config();
        config.format = OutputFormat::Json;
        let cmd = ExtractCommand::new(config);

        let output =
            cmd.execute_with_renderer(renderer, &["https://s/milk".to_string()]).await.unwrap();
        let parsed: Vec<ProductResult> = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, vec![ProductResult::new("Leite 1L", 4.79, "https://s/milk")]);
    }

    #[tokio::test]
    async fn test_extract_does_not_persist() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = make_test_config();
        config.data_dir = dir.path().join("data");

        let renderer = MockRenderer::new(vec![("https://s/milk", product_page("Leite 1L", "4.79"))]);
        ExtractCommand::new(config)
            .execute_with_renderer(renderer, &["https://s/milk".to_string()])
            .await
            .unwrap();

        assert!(!dir.path().join("data").exists());
    }
}
