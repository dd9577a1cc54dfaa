//! Catalog and stock API.
//!
//! # Architecture
//!
//! - The catalog service is the source of truth for product details and
//!   stock levels; the cart only copies what it needs into each line
//! - [`CatalogService`] is the seam the cart store depends on, so tests can
//!   swap in an in-process catalog
//! - [`CatalogClient`] is the HTTP implementation (`reqwest`), caching
//!   product details via `moka`. Stock is always fetched fresh.
//!
//! # Endpoints
//!
//! - `GET products/{id}` - product record (`id`, `title`, `price`, `image`)
//! - `GET stock/{id}` - stock record (`id`, `amount`)

mod client;

pub use client::CatalogClient;

use async_trait::async_trait;
use rocketshoes_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The configured base URL cannot have path segments appended.
    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Product details as served by `GET products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
}

/// Stock level as served by `GET stock/{id}`.
///
/// `amount` is the maximum quantity of the product a cart may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default)]
    pub id: Option<ProductId>,
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units fit under this stock ceiling.
    #[must_use]
    pub fn allows(&self, requested: u32) -> bool {
        i64::from(requested) <= self.amount
    }
}

/// Read access to product details and stock levels.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch product details.
    async fn product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError>;

    /// Fetch the current stock level.
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError>;
}
