//! Headless Chromium renderer (chromiumoxide).
//!
//! One browser session serves a whole run: launched once, a single tab is
//! reused for every URL, and [`PageRenderer::close`] tears it down. If the
//! renderer is dropped without closing, chromiumoxide kills the child process.

use crate::config::Config;
use crate::store::client::{Engine, PageRenderer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// Browser-backed renderer that waits for client-side scripts before reading the DOM.
pub struct BrowserRenderer {
    browser: Mutex<Option<Browser>>,
    page: Page,
    handler: Option<JoinHandle<()>>,
    settle: Duration,
}

impl BrowserRenderer {
    /// Launches a browser session with the given configuration.
    pub async fn launch(config: &Config) -> Result<Self> {
        let (mut browser, mut handler) =
            Browser::launch(browser_config(config)?).await.context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("CDP handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(e).context("Failed to open browser tab");
            }
        };

        info!("Browser session started (headless: {})", config.headless);

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            page,
            handler: Some(handler),
            settle: Duration::from_millis(config.settle_ms),
        })
    }
}

/// Builds Chromium launch options: no GPU, no images, fixed desktop viewport.
pub fn browser_config(config: &Config) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
        .request_timeout(Duration::from_secs(config.page_load_timeout_secs))
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--blink-settings=imagesEnabled=false");

    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path);
    }

    if let Some(proxy) = &config.proxy {
        debug!("Configuring proxy: {}", proxy);
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder.build().map_err(|e| anyhow::anyhow!("Invalid browser configuration: {}", e))
}

#[async_trait]
impl PageRenderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        debug!("Navigating to {}", url);
        self.page.goto(url).await.with_context(|| format!("Navigation failed: {}", url))?;

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        self.page.content().await.context("Failed to read rendered page")
    }

    async fn close(&mut self) -> Result<()> {
        let Some(mut browser) = self.browser.get_mut().take() else {
            return Ok(());
        };

        let closed = browser.close().await.context("Failed to close browser");
        let _ = browser.wait().await;

        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        info!("Browser session closed");
        closed.map(|_| ())
    }

    fn engine(&self) -> Engine {
        Engine::Browser
    }
}
