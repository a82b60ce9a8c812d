//! Page rendering seam and the plain HTTP engine (wreq with TLS fingerprint emulation).

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Engine used to turn a product URL into rendered HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Headless Chromium; runs client-side scripts before reading the page.
    #[default]
    Browser,
    /// Single HTTP GET; enough for stores that embed JSON-LD server side.
    Http,
}

impl Engine {
    /// Returns all engines.
    pub fn all() -> &'static [Engine] {
        &[Engine::Browser, Engine::Http]
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" | "chrome" | "chromium" => Ok(Engine::Browser),
            "http" => Ok(Engine::Http),
            _ => Err(format!("Unknown engine: {}. Use: browser, http", s)),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Browser => write!(f, "browser"),
            Engine::Http => write!(f, "http"),
        }
    }
}

/// Trait for rendering product pages - enables mocking for tests.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigates to `url` and returns the rendered HTML.
    async fn render(&self, url: &str) -> Result<String>;

    /// Releases the underlying session. Must be called before results are persisted.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Returns the engine backing this renderer.
    fn engine(&self) -> Engine;
}

/// Plain HTTP renderer with browser impersonation.
pub struct HttpRenderer {
    client: Client,
    accept_language: String,
}

impl HttpRenderer {
    /// Creates a new HTTP renderer with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.page_load_timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self { client, accept_language: config.accept_language.clone() })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", self.accept_language.as_str())
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Rate limited (503). Consider increasing --delay or using the browser engine.");
            anyhow::bail!("Rate limited by store (503). Try increasing --delay.");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        let final_url = response.uri().to_string();
        if final_url != url {
            debug!("Redirected to {}", final_url);
        }

        response.text().await.context("Failed to read response body")
    }

    fn engine(&self) -> Engine {
        Engine::Http
    }
}
