//! Catalog API client implementation.
//!
//! Uses `reqwest` for HTTP. Caches product details using `moka`
//! (configurable TTL, zero disables it); stock levels always go to the network.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use rocketshoes_core::ProductId;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{CatalogError, CatalogProduct, CatalogService, Stock};
use crate::config::CatalogConfig;

/// How much of an error body is kept for logs and error values.
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog/stock REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    /// `None` when the configured TTL is zero.
    products: Option<Cache<ProductId, CatalogProduct>>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the base URL
    /// cannot carry path segments.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let products = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                products,
            }),
        })
    }

    /// Resolve `{base_url}/{resource}/{id}`.
    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, CatalogError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push(resource)
            .push(&id.to_string());
        Ok(url)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let mut request = self
            .inner
            .client
            .get(url.clone())
            .header("Accept", "application/json");
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: response_text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }
}

#[async_trait]
impl CatalogService for CatalogClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint("products", id)?;
        let product: CatalogProduct = self.get_json(url).await?;

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let url = self.endpoint("stock", id)?;
        let stock: Stock = self.get_json(url).await?;
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }
}
