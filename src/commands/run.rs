//! Daily run: scrape every configured page, then merge into the monthly files.

use crate::commands::session;
use crate::config::Config;
use crate::format::Formatter;
use crate::ledger::{Ledger, RunContext};
use crate::store::{PageRenderer, ProductResult};
use anyhow::{Context, Result};
use tracing::info;

/// Executes the scrape-and-accumulate batch.
pub struct RunCommand {
    config: Config,
}

impl RunCommand {
    /// Creates a new run command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the batch with the configured engine and URL list.
    pub async fn execute(&self, ctx: RunContext) -> Result<String> {
        let urls = self.config.resolve_urls()?;
        let results = session::scrape_with_config(&self.config, &urls).await?;

        self.persist(ctx, &results)
    }

    /// Runs the batch with a provided renderer (for testing).
    pub async fn execute_with_renderer(
        &self,
        renderer: impl PageRenderer,
        urls: &[String],
        ctx: RunContext,
    ) -> Result<String> {
        let results = session::scrape_urls(&self.config, renderer, urls).await;

        self.persist(ctx, &results)
    }

    fn persist(&self, ctx: RunContext, results: &[ProductResult]) -> Result<String> {
        info!(
            "Merging {} {} results for {} into {} files",
            results.len(),
            ctx.store(),
            ctx.date(),
            ctx.month_stamp()
        );

        let ledger = Ledger::new(ctx);
        let report = ledger.accumulate(results).context("Failed to persist results")?;

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_report(results.len(), &report))
    }
}
