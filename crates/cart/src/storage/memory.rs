//! In-memory key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, StorageError};

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `key = value`.
    #[must_use]
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            items: RwLock::new(HashMap::from([(key.into(), value.into())])),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
