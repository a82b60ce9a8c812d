//! Integration tests against saved product pages.

use chrono::NaiveDate;
use price_ledger::ledger::{Ledger, RunContext};
use price_ledger::store::parser::{script_payloads, try_extract};
use price_ledger::store::{extract_from_html, ProductResult};
use std::fs;
use tempfile::TempDir;

const PRODUCT_URL: &str = "https://mercado.example.com.br/arroz-tio-joao-2kg/p";
const SEARCH_URL: &str = "https://mercado.example.com.br/busca?q=pao+frances";

const PRODUCT_PAGE: &str = include_str!("fixtures/product_page.html");
const SEARCH_PAGE: &str = include_str!("fixtures/search_page.html");

#[test]
fn test_collects_all_json_ld_blocks() {
    let payloads = script_payloads(PRODUCT_PAGE);

    // Inline state script is not JSON-LD
    assert_eq!(payloads.len(), 5);
    assert!(payloads.iter().all(|p| !p.contains("__STATE__")));
}

#[test]
fn test_extracts_first_product_past_broken_block() {
    let result = extract_from_html(PRODUCT_PAGE, PRODUCT_URL);

    assert_eq!(result.name, "Arroz Branco Longo-fino Tipo 1 Tio João 2kg");
    assert_eq!(result.price, 12.9);
    assert_eq!(result.source_url, PRODUCT_URL);
    assert!(result.is_priced());
}

#[test]
fn test_search_page_has_no_product() {
    let html = SEARCH_PAGE;

    assert!(try_extract(&script_payloads(html)).is_err());
    assert_eq!(extract_from_html(html, SEARCH_URL), ProductResult::not_found(SEARCH_URL));
}

#[test]
fn test_pages_flow_into_monthly_table() {
    let dir = TempDir::new().unwrap();
    let results = vec![
        extract_from_html(PRODUCT_PAGE, PRODUCT_URL),
        extract_from_html(SEARCH_PAGE, SEARCH_URL),
    ];

    let date = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
    let ledger = Ledger::new(RunContext::new(dir.path(), "carrefour", date));
    let report = ledger.accumulate(&results).unwrap();

    assert_eq!(report.priced, 1);
    assert_eq!(report.failed(), 1);

    let table = ledger.load_table().unwrap().unwrap();
    assert_eq!(
        table.price("Arroz Branco Longo-fino Tipo 1 Tio João 2kg", "Preço_20240503"),
        Some(12.9)
    );
    assert_eq!(table.len(), 1);

    let log = fs::read_to_string(dir.path().join("erros_carrefour_2024-05.csv")).unwrap();
    assert!(log.contains(SEARCH_URL));
    assert!(log.contains("not found"));
    assert!(log.contains("2024-05-03"));
}
