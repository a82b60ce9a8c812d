//! price-ledger - Daily grocery price tracker
//!
//! Scrapes JSON-LD product prices and keeps one wide CSV table per month.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use price_ledger::commands::{ExtractCommand, RunCommand, ShowCommand};
use price_ledger::config::{Config, OutputFormat};
use price_ledger::ledger::RunContext;
use price_ledger::store::Engine;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "price-ledger",
    version,
    about = "Daily grocery price tracker",
    long_about = "Renders product pages, extracts schema.org JSON-LD prices, and appends each day as a column in a monthly table."
)]
struct Cli {
    /// Rendering engine (browser, http)
    #[arg(short, long, global = true, env = "PRICES_ENGINE")]
    engine: Option<Engine>,

    /// Directory for monthly price tables and error logs
    #[arg(short, long, global = true, env = "PRICES_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "PRICES_PROXY")]
    proxy: Option<String>,

    /// Pause between pages in milliseconds
    #[arg(long, global = true, env = "PRICES_DELAY")]
    delay: Option<u64>,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    headful: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every configured page and merge today's prices into the monthly table
    #[command(alias = "r")]
    Run {
        /// Record prices under this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// File with one product URL per line
        #[arg(long)]
        urls_file: Option<PathBuf>,
    },

    /// Extract name and price from pages without saving anything
    #[command(alias = "x")]
    Extract {
        /// Product page URL(s)
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// List the configured product URLs
    Urls,

    /// Print a month's price table
    Show {
        /// Month to show (YYYY-MM); defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env()
            .add_directive(Level::INFO.into())
            .add_directive("chromiumoxide=warn".parse()?)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(engine) = cli.engine {
        config.engine = engine;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if cli.headful {
        config.headless = false;
    }

    match cli.command {
        Commands::Run { date, urls_file } => {
            if let Some(path) = urls_file {
                config.urls_file = Some(path);
            }

            let ctx = match date {
                Some(date) => RunContext::new(&config.data_dir, &config.store, date),
                None => RunContext::today(&config.data_dir, &config.store),
            };

            let cmd = RunCommand::new(config);
            let output = cmd.execute(ctx).await?;
            println!("{}", output);
        }

        Commands::Extract { urls } => {
            let cmd = ExtractCommand::new(config);
            let output = cmd.execute(&urls).await?;
            println!("{}", output);
        }

        Commands::Urls => {
            let urls = config.resolve_urls()?;
            for url in &urls {
                println!("{}", url);
            }
            eprintln!("\n{} URLs", urls.len());
        }

        Commands::Show { month } => {
            let cmd = ShowCommand::new(config);
            let output = cmd.execute(month.as_deref())?;
            println!("{}", output);
        }
    }

    Ok(())
}
