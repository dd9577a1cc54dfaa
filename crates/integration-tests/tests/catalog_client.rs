//! Integration tests for the catalog HTTP client.
//!
//! Each test starts its own stub catalog on a local port.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rocketshoes_cart::{CatalogClient, CatalogConfig, CatalogError, CatalogService};
use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::StubCatalog;
use rust_decimal::Decimal;
use secrecy::SecretString;

fn client(stub: &StubCatalog) -> CatalogClient {
    CatalogClient::new(&CatalogConfig::new(stub.base_url())).unwrap()
}

#[tokio::test]
async fn test_fetches_product_details() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Tênis de Caminhada", 179.9, "https://example.test/1.jpg", 3);

    let product = client(&stub).product(ProductId::new(1)).await.unwrap();

    assert_eq!(product.id, ProductId::new(1));
    assert_eq!(product.title, "Tênis de Caminhada");
    assert_eq!(product.image, "https://example.test/1.jpg");
    assert!(product.price > Decimal::from(179) && product.price < Decimal::from(180));
}

#[tokio::test]
async fn test_fetches_stock() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(2, "Boot", 250.0, "b", 7);

    let stock = client(&stub).stock(ProductId::new(2)).await.unwrap();

    assert_eq!(stock.amount, 7);
    assert_eq!(stock.id, Some(ProductId::new(2)));
}

#[tokio::test]
async fn test_product_details_are_cached() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let client = client(&stub);

    client.product(ProductId::new(1)).await.unwrap();
    client.product(ProductId::new(1)).await.unwrap();

    assert_eq!(stub.product_hits(), 1);
}

#[tokio::test]
async fn test_stock_is_never_cached() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let client = client(&stub);

    assert_eq!(client.stock(ProductId::new(1)).await.unwrap().amount, 3);
    stub.set_stock(1, 0);
    assert_eq!(client.stock(ProductId::new(1)).await.unwrap().amount, 0);

    assert_eq!(stub.stock_hits(), 2);
}

#[tokio::test]
async fn test_zero_ttl_disables_product_cache() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let mut config = CatalogConfig::new(stub.base_url());
    config.cache_ttl = Duration::ZERO;
    let client = CatalogClient::new(&config).unwrap();

    client.product(ProductId::new(1)).await.unwrap();
    client.product(ProductId::new(1)).await.unwrap();

    assert_eq!(stub.product_hits(), 2);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let stub = StubCatalog::spawn().await.unwrap();

    let err = client(&stub).product(ProductId::new(404)).await.unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(ref path) if path == "/products/404"));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.respond_with("stock/1", 429, "slow down", Some(7));

    let err = client(&stub).stock(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CatalogError::RateLimited(7)));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.respond_with("stock/1", 503, "maintenance", None);

    let err = client(&stub).stock(ProductId::new(1)).await.unwrap_err();

    match err {
        CatalogError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.respond_with("products/1", 200, "{\"id\": 1, \"title\":", None);

    let err = client(&stub).product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CatalogError::Parse(_)));
}

#[tokio::test]
async fn test_sends_bearer_token() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let mut config = CatalogConfig::new(stub.base_url());
    config.api_token = Some(SecretString::from("tok_live_123"));

    CatalogClient::new(&config)
        .unwrap()
        .stock(ProductId::new(1))
        .await
        .unwrap();

    assert_eq!(stub.last_authorization().as_deref(), Some("Bearer tok_live_123"));
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);

    client(&stub).stock(ProductId::new(1)).await.unwrap();

    assert_eq!(stub.last_authorization(), None);
}
