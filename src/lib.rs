//! price-ledger - Daily grocery price tracker
//!
//! Renders product pages, reads their schema.org JSON-LD `Product` record,
//! and records each day's prices as a new column in a monthly wide table.

pub mod commands;
pub mod config;
pub mod format;
pub mod ledger;
pub mod store;

pub use config::Config;
pub use ledger::{Ledger, MonthlyPriceTable, RunContext};
pub use store::{extract, Engine, ProductResult};
