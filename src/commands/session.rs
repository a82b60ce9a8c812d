//! Sequential scrape loop shared by the `run` and `extract` commands.

use crate::config::Config;
use crate::store::{
    extract_from_html, BrowserRenderer, Engine, HttpRenderer, PageRenderer, ProductResult,
};
use anyhow::{Context, Result};
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Acquires the configured renderer and visits every URL.
///
/// Only renderer acquisition can fail; per-page failures become sentinel results.
pub async fn scrape_with_config(config: &Config, urls: &[String]) -> Result<Vec<ProductResult>> {
    info!("Visiting {} product pages with the {} engine", urls.len(), config.engine);

    match config.engine {
        Engine::Browser => {
            let renderer =
                BrowserRenderer::launch(config).await.context("Failed to start browser session")?;
            Ok(scrape_urls(config, renderer, urls).await)
        }
        Engine::Http => {
            let renderer = HttpRenderer::new(config).context("Failed to create HTTP client")?;
            Ok(scrape_urls(config, renderer, urls).await)
        }
    }
}

/// Visits `urls` one at a time and closes the renderer before returning.
pub async fn scrape_urls<R: PageRenderer>(
    config: &Config,
    mut renderer: R,
    urls: &[String],
) -> Vec<ProductResult> {
    let mut results = Vec::with_capacity(urls.len());

    for (i, url) in urls.iter().enumerate() {
        if i > 0 {
            pause(config).await;
        }

        info!("[{}/{}] {}", i + 1, urls.len(), url);
        results.push(scrape_one(config, &renderer, url).await);
    }

    if let Err(e) = renderer.close().await {
        warn!("Failed to close {} session: {:#}", renderer.engine(), e);
    }

    let priced = results.iter().filter(|r| r.is_priced()).count();
    info!("Finished: {} of {} pages priced", priced, results.len());

    results
}

/// Renders and extracts one page. Navigation errors and timeouts degrade to the sentinel.
async fn scrape_one<R: PageRenderer>(config: &Config, renderer: &R, url: &str) -> ProductResult {
    let timeout = Duration::from_secs(config.page_load_timeout_secs);

    match tokio::time::timeout(timeout, renderer.render(url)).await {
        Ok(Ok(html)) => extract_from_html(&html, url),
        Ok(Err(e)) => {
            warn!("Failed to render {}: {:#}", url, e);
            ProductResult::not_found(url)
        }
        Err(_) => {
            warn!("Page load timed out after {}s: {}", config.page_load_timeout_secs, url);
            ProductResult::not_found(url)
        }
    }
}

/// Fixed pause between pages, plus optional random jitter.
async fn pause(config: &Config) {
    if config.delay_ms == 0 && config.delay_jitter_ms == 0 {
        return;
    }

    let jitter = if config.delay_jitter_ms > 0 {
        rand::rng().random_range(0..=config.delay_jitter_ms)
    } else {
        0
    };

    let total_delay = config.delay_ms + jitter;
    debug!("Delaying {}ms", total_delay);
    tokio::time::sleep(Duration::from_millis(total_delay)).await;
}
