//! CSS selectors for locating structured data in rendered product pages.
//!
//! Extraction relies on schema.org JSON-LD rather than page markup, so this
//! is the only selector the store needs. Update it if the store moves its
//! metadata into a different container.

use scraper::Selector;
use std::sync::LazyLock;

/// Embedded JSON-LD blocks.
pub static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
