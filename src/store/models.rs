//! Data model for a single product page visit.

use serde::{Deserialize, Serialize};

/// Name recorded when a page carries no usable `Product` record.
pub const NOT_FOUND_NAME: &str = "not found";

/// Price recorded when extraction fails. Never a real shelf price.
pub const SENTINEL_PRICE: f64 = 0.0;

/// Outcome of visiting one product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResult {
    /// Product name as published in the page's structured data
    pub name: String,
    /// Normalized price, or [`SENTINEL_PRICE`] when it could not be read
    pub price: f64,
    /// Page the result was extracted from
    pub source_url: String,
}

impl ProductResult {
    /// Creates a result for a page that yielded a product.
    pub fn new(name: impl Into<String>, price: f64, source_url: impl Into<String>) -> Self {
        Self { name: name.into(), price, source_url: source_url.into() }
    }

    /// Creates the sentinel result for a page with nothing usable.
    pub fn not_found(source_url: impl Into<String>) -> Self {
        Self::new(NOT_FOUND_NAME, SENTINEL_PRICE, source_url)
    }

    /// Returns true if this result carries a real price and belongs in the price table.
    pub fn is_priced(&self) -> bool {
        self.price > SENTINEL_PRICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_sentinel() {
        let result = ProductResult::not_found("https://example.com/p");
        assert_eq!(result.name, NOT_FOUND_NAME);
        assert_eq!(result.price, 0.0);
        assert_eq!(result.source_url, "https://example.com/p");
        assert!(!result.is_priced());
    }

    #[test]
    fn test_is_priced() {
        assert!(ProductResult::new("Rice", 22.90, "u").is_priced());
        assert!(!ProductResult::new("Rice", 0.0, "u").is_priced());
        assert!(!ProductResult::new("Rice", -1.0, "u").is_priced());
    }

    #[test]
    fn test_product_result_serde() {
        let result = ProductResult::new("Feijão Carioca 1kg", 8.49, "https://example.com/p");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("Feijão Carioca 1kg"));
        assert!(json.contains("\"source_url\""));

        let parsed: ProductResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
