//! Cart operation errors.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Why a cart operation left the cart unchanged.
#[derive(Debug, Error)]
pub enum CartError {
    /// Catalog or stock lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Persisting the cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Requested amount exceeds the stock ceiling.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// Line amounts must be at least one.
    #[error("Invalid amount: {0}")]
    InvalidAmount(u32),
}
