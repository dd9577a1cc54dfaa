//! Key-value persistence for the cart.
//!
//! The [`KeyValueStore`] trait mirrors browser local storage: string keys,
//! string values, and every write replaces the whole value (last write wins).
//!
//! - [`FileStore`] - one file per key inside a directory
//! - [`MemoryStore`] - process-local map for tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when reading or writing the store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be mapped to a storage location.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String key-value storage with whole-value replacement.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
