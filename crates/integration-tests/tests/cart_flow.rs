//! End-to-end cart tests: stub catalog over HTTP, cart persisted to disk.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use rocketshoes_cart::codec::CART_STORAGE_KEY;
use rocketshoes_cart::{
    CartError, CartStore, CatalogClient, CatalogConfig, ChannelNotifier, FileStore,
    KeyValueStore, Notice,
};
use rocketshoes_core::{CurrencyCode, ProductId};
use rocketshoes_integration_tests::StubCatalog;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;
use tokio::sync::mpsc::UnboundedReceiver;

async fn open_store(
    stub: &StubCatalog,
    dir: &Path,
) -> (CartStore, UnboundedReceiver<Notice>) {
    let catalog = CatalogClient::new(&CatalogConfig::new(stub.base_url())).unwrap();
    let (notifier, notices) = ChannelNotifier::channel();
    let store = CartStore::load(
        Arc::new(catalog),
        Arc::new(FileStore::new(dir)),
        Arc::new(notifier),
        CurrencyCode::BRL,
    )
    .await;
    (store, notices)
}

async fn stored_json(dir: &Path) -> serde_json::Value {
    let raw = FileStore::new(dir)
        .get_item(CART_STORAGE_KEY)
        .await
        .unwrap()
        .unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_add_to_empty_cart() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let dir = tempdir().unwrap();
    let (store, mut notices) = open_store(&stub, dir.path()).await;

    let cart = store.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(cart.len(), 1);
    let line = cart.find(ProductId::new(1)).unwrap();
    assert_eq!(line.amount, 1);
    assert_eq!(line.title, "Shoe");
    assert_eq!(line.price, Decimal::from(10));
    assert_eq!(line.image, "x");

    assert_eq!(
        stored_json(dir.path()).await,
        json!([{ "id": 1, "amount": 1, "image": "x", "price": 10.0, "title": "Shoe" }])
    );
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn test_amount_above_stock_leaves_cart_unchanged() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let dir = tempdir().unwrap();
    let (store, mut notices) = open_store(&stub, dir.path()).await;
    let before = store.add_product(ProductId::new(1)).await.unwrap();

    let err = store
        .update_product_amount(ProductId::new(1), 5)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CartError::InsufficientStock {
            requested: 5,
            available: 3,
            ..
        }
    ));
    assert_eq!(notices.try_recv().unwrap(), Notice::InsufficientStock);
    assert_eq!(store.cart().await, before);
    assert_eq!(stored_json(dir.path()).await[0]["amount"], 1);
}

#[tokio::test]
async fn test_repeated_add_reads_fresh_stock() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 2);
    let dir = tempdir().unwrap();
    let (store, mut notices) = open_store(&stub, dir.path()).await;

    store.add_product(ProductId::new(1)).await.unwrap();
    store.add_product(ProductId::new(1)).await.unwrap();
    let err = store.add_product(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, CartError::InsufficientStock { .. }));
    assert_eq!(notices.try_recv().unwrap(), Notice::InsufficientStock);

    stub.set_stock(1, 5);
    let cart = store.add_product(ProductId::new(1)).await.unwrap();

    assert_eq!(cart.find(ProductId::new(1)).unwrap().amount, 3);
    assert_eq!(stub.product_hits(), 1);
    assert_eq!(stub.stock_hits(), 3);
}

#[tokio::test]
async fn test_catalog_outage_reports_add_failure() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.respond_with("products/1", 500, "boom", None);
    let dir = tempdir().unwrap();
    let (store, mut notices) = open_store(&stub, dir.path()).await;

    let err = store.add_product(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert_eq!(notices.try_recv().unwrap(), Notice::ProductAddFailed);
    assert!(store.cart().await.is_empty());
    assert!(
        FileStore::new(dir.path())
            .get_item(CART_STORAGE_KEY)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_stock_outage_reports_amount_failure() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let dir = tempdir().unwrap();
    let (store, mut notices) = open_store(&stub, dir.path()).await;
    store.add_product(ProductId::new(1)).await.unwrap();
    stub.respond_with("stock/1", 502, "upstream down", None);

    let err = store
        .update_product_amount(ProductId::new(1), 2)
        .await
        .unwrap_err();

    assert!(matches!(err, CartError::Catalog(_)));
    assert_eq!(notices.try_recv().unwrap(), Notice::AmountChangeFailed);

    stub.clear_response("stock/1");
    let cart = store
        .update_product_amount(ProductId::new(1), 2)
        .await
        .unwrap();
    assert_eq!(cart.find(ProductId::new(1)).unwrap().amount, 2);
}

#[tokio::test]
async fn test_remove_then_reload() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    stub.add_product(2, "Boot", 139.9, "y", 3);
    let dir = tempdir().unwrap();

    {
        let (store, _notices) = open_store(&stub, dir.path()).await;
        store.add_product(ProductId::new(1)).await.unwrap();
        store.add_product(ProductId::new(2)).await.unwrap();
        store.update_product_amount(ProductId::new(2), 2).await.unwrap();

        let cart = store.remove_product(ProductId::new(1)).await.unwrap();
        assert_eq!(cart.len(), 1);

        let cart = store.remove_product(ProductId::new(1)).await.unwrap();
        assert_eq!(cart.len(), 1);
    }

    let (reopened, _notices) = open_store(&stub, dir.path()).await;
    let cart = reopened.cart().await;
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.find(ProductId::new(2)).unwrap().amount, 2);

    let summary = reopened.summary().await;
    assert_eq!(summary.total.display(), "R$ 279,80");
    assert_eq!(summary.item_count, 2);
}

#[tokio::test]
async fn test_corrupt_storage_starts_empty() {
    let stub = StubCatalog::spawn().await.unwrap();
    stub.add_product(1, "Shoe", 10.0, "x", 3);
    let dir = tempdir().unwrap();
    FileStore::new(dir.path())
        .set_item(CART_STORAGE_KEY, "{\"not\": \"a cart\"")
        .await
        .unwrap();

    let (store, _notices) = open_store(&stub, dir.path()).await;
    assert!(store.cart().await.is_empty());

    let cart = store.add_product(ProductId::new(1)).await.unwrap();
    assert_eq!(stored_json(dir.path()).await.as_array().unwrap().len(), cart.len());
}
