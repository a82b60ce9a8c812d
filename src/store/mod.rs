//! Store-facing modules: page rendering, JSON-LD extraction, and URL lists.

pub mod browser;
pub mod catalog;
pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use browser::BrowserRenderer;
pub use client::{Engine, HttpRenderer, PageRenderer};
pub use models::ProductResult;
pub use parser::{extract, extract_from_html, ExtractError};
