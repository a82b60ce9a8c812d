//! JSON-LD extraction of product name and price from rendered pages.
//!
//! Pages embed one or more `<script type="application/ld+json">` blocks. Most
//! are breadcrumbs, organization or search-box metadata; the one we want is a
//! schema.org `Product` whose `offers` carry the shelf price. The public entry
//! point [`extract`] never fails: anything unusable collapses to the
//! "not found" / `0.0` sentinel so every URL is handled the same way.

use crate::store::models::{ProductResult, NOT_FOUND_NAME, SENTINEL_PRICE};
use crate::store::selectors;
use scraper::Html;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// schema.org type carrying name and offers.
const PRODUCT_TYPE: &str = "Product";

/// Reasons a page fails to yield a usable price.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("no Product record in {0} structured-data block(s)")]
    NoProduct(usize),

    #[error("Product has no offer price")]
    MissingPrice,

    #[error("unparsable price: {0}")]
    InvalidPrice(String),
}

/// A located `Product` record. The price keeps its failure reason so callers
/// can tell a missing offer from a malformed one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProduct {
    pub name: String,
    pub price: Result<f64, ExtractError>,
}

/// `offers` is either a single Offer object or a list of them.
#[derive(Debug, Clone, Copy)]
enum Offers<'a> {
    Single(&'a Map<String, Value>),
    List(&'a [Value]),
}

impl<'a> Offers<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Offers::Single(map)),
            Value::Array(items) => Some(Offers::List(items)),
            _ => None,
        }
    }

    /// Raw price of the offer that counts: the object itself or the first list entry.
    fn price(self) -> Option<&'a Value> {
        let price = match self {
            Offers::Single(map) => map.get("price"),
            Offers::List(items) => items.first()?.get("price"),
        };
        price.filter(|v| !v.is_null())
    }
}

/// Collects the text of every JSON-LD block in document order.
pub fn script_payloads(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&selectors::JSON_LD)
        .map(|e| e.text().collect::<String>())
        .filter(|raw| !raw.trim().is_empty())
        .collect()
}

/// Extracts the first `Product` from a rendered page.
pub fn extract_from_html(html: &str, url: &str) -> ProductResult {
    extract(&script_payloads(html), url)
}

/// Extracts name and normalized price from a page's structured-data payloads.
///
/// Always returns a result. A page without a `Product` yields
/// [`ProductResult::not_found`]; a `Product` whose price cannot be read keeps
/// its name with a `0.0` price.
pub fn extract<S: AsRef<str>>(payloads: &[S], url: &str) -> ProductResult {
    let product = match try_extract(payloads) {
        Ok(product) => product,
        Err(e) => {
            warn!("Nothing found at {}: {}", url, e);
            return ProductResult::not_found(url);
        }
    };

    let price = product.price.unwrap_or_else(|e| {
        warn!("{} at {}: {}", product.name, url, e);
        SENTINEL_PRICE
    });

    info!("Found {} | R$ {:.2}", product.name, price);
    ProductResult::new(product.name, price, url)
}

/// Locates the first `Product` across payloads, in payload then object order.
pub fn try_extract<S: AsRef<str>>(payloads: &[S]) -> Result<ExtractedProduct, ExtractError> {
    let product = find_product(payloads).ok_or(ExtractError::NoProduct(payloads.len()))?;

    let name = match product.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Null) | None => NOT_FOUND_NAME.to_string(),
        Some(other) => other.to_string(),
    };

    let price = product
        .get("offers")
        .and_then(Offers::from_value)
        .and_then(Offers::price)
        .ok_or(ExtractError::MissingPrice)
        .and_then(normalize_price);

    Ok(ExtractedProduct { name, price })
}

fn find_product<S: AsRef<str>>(payloads: &[S]) -> Option<Map<String, Value>> {
    for (index, raw) in payloads.iter().enumerate() {
        let value: Value = match serde_json::from_str(raw.as_ref()) {
            Ok(v) => v,
            Err(e) => {
                debug!("Skipping structured-data block {}: {}", index, e);
                continue;
            }
        };

        let candidates = match value {
            Value::Array(items) => items,
            other => vec![other],
        };

        for candidate in candidates {
            if let Value::Object(map) = candidate {
                if map.get("@type").and_then(Value::as_str) == Some(PRODUCT_TYPE) {
                    trace!("Product record found in block {}", index);
                    return Some(map);
                }
            }
        }
    }

    None
}

/// Coerces a raw offer price to a number, accepting a comma decimal separator.
pub fn normalize_price(value: &Value) -> Result<f64, ExtractError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(ExtractError::InvalidPrice(value.to_string())),
    }
}
