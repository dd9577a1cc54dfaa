//! Integration test support for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_client` - HTTP client status/body handling against a stub API
//! - `cart_flow` - Cart store driven end to end through HTTP and the file store
//!
//! The stub catalog is an `axum` server bound to an ephemeral local port,
//! serving the same `products/{id}` and `stock/{id}` routes as the real API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// A canned response that replaces the normal handler for one path.
#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: String,
    retry_after: Option<u64>,
}

#[derive(Default)]
struct StubCatalogState {
    products: Mutex<HashMap<i32, Value>>,
    stock: Mutex<HashMap<i32, i64>>,
    canned: Mutex<HashMap<String, CannedResponse>>,
    last_authorization: Mutex<Option<String>>,
    product_hits: AtomicUsize,
    stock_hits: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StubCatalogState {
    fn record_authorization(&self, headers: &HeaderMap) {
        *lock(&self.last_authorization) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }

    fn canned(&self, key: &str) -> Option<Response> {
        let canned = lock(&self.canned).get(key).cloned()?;
        let mut response = (canned.status, canned.body).into_response();
        if let Some(secs) = canned.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, secs.into());
        }
        Some(response)
    }
}

async fn product(
    State(state): State<Arc<StubCatalogState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    state.record_authorization(&headers);

    if let Some(response) = state.canned(&format!("products/{id}")) {
        return response;
    }

    match lock(&state.products).get(&id) {
        Some(record) => axum::Json(record.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, axum::Json(json!({}))).into_response(),
    }
}

async fn stock(
    State(state): State<Arc<StubCatalogState>>,
    Path(id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    state.record_authorization(&headers);

    if let Some(response) = state.canned(&format!("stock/{id}")) {
        return response;
    }

    match lock(&state.stock).get(&id) {
        Some(amount) => axum::Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, axum::Json(json!({}))).into_response(),
    }
}

/// In-process stand-in for the catalog/stock API.
///
/// The server task is aborted when the stub is dropped.
pub struct StubCatalog {
    state: Arc<StubCatalogState>,
    addr: SocketAddr,
    server: JoinHandle<()>,
}

impl StubCatalog {
    /// Start serving on `127.0.0.1` with an OS-assigned port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let state = Arc::new(StubCatalogState::default());
        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            state,
            addr,
            server,
        })
    }

    /// Base URL to point a catalog client at.
    ///
    /// # Panics
    ///
    /// Never in practice: a socket address always forms a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("socket address forms a valid URL")
    }

    /// Register a product and its stock level.
    pub fn add_product(&self, id: i32, title: &str, price: f64, image: &str, stock: i64) {
        lock(&self.state.products).insert(
            id,
            json!({ "id": id, "title": title, "price": price, "image": image }),
        );
        self.set_stock(id, stock);
    }

    /// Change the stock level of a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        lock(&self.state.stock).insert(id, amount);
    }

    /// Answer `path` (e.g. `"stock/1"`) with a fixed status and body.
    pub fn respond_with(&self, path: &str, status: u16, body: &str, retry_after: Option<u64>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        lock(&self.state.canned).insert(
            path.to_string(),
            CannedResponse {
                status,
                body: body.to_string(),
                retry_after,
            },
        );
    }

    /// Stop answering `path` with a canned response.
    pub fn clear_response(&self, path: &str) {
        lock(&self.state.canned).remove(path);
    }

    /// Number of `products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `stock/{id}` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the latest request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.state.last_authorization).clone()
    }
}

impl Drop for StubCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}
