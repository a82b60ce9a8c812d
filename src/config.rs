//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::store::catalog;
use crate::store::client::Engine;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the monthly price tables and error logs
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Store slug used in file names (precos_<store>_YYYY-MM.csv)
    #[serde(default = "default_store")]
    pub store: String,

    /// Rendering engine
    #[serde(default)]
    pub engine: Engine,

    /// Run the browser without a window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chromium/Chrome binary; auto-detected when unset
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Pause between product pages in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the pause (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Wait after navigation for client-side scripts to settle
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// A page that has not loaded after this many seconds counts as failed
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Accept-Language sent by the HTTP engine
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Product URLs; overrides the built-in list when non-empty
    #[serde(default)]
    pub urls: Vec<String>,

    /// File with one product URL per line; takes precedence over `urls`
    #[serde(default)]
    pub urls_file: Option<PathBuf>,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_store() -> String {
    "carrefour".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_settle_ms() -> u64 {
    2000
}

fn default_page_load_timeout_secs() -> u64 {
    60
}

fn default_accept_language() -> String {
    "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: default_store(),
            engine: Engine::Browser,
            headless: default_headless(),
            chrome_executable: None,
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: 0,
            settle_ms: default_settle_ms(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            accept_language: default_accept_language(),
            urls: Vec::new(),
            urls_file: None,
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("price-ledger.toml");
        if local_config.exists() {
            debug!("Found price-ledger.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("price-ledger").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(dir) = std::env::var("PRICES_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Ok(engine) = std::env::var("PRICES_ENGINE") {
            if let Ok(e) = engine.parse() {
                self.engine = e;
            }
        }

        if let Ok(proxy) = std::env::var("PRICES_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("PRICES_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(headless) = std::env::var("PRICES_HEADLESS") {
            if let Ok(h) = headless.parse() {
                self.headless = h;
            }
        }

        self
    }

    /// Resolves the URL list: `urls_file`, then `urls`, then the built-in list.
    pub fn resolve_urls(&self) -> Result<Vec<String>> {
        if let Some(path) = &self.urls_file {
            return catalog::load_url_file(path);
        }

        if !self.urls.is_empty() {
            return Ok(self.urls.clone());
        }

        Ok(catalog::default_urls())
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
