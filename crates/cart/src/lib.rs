//! RocketShoes cart library.
//!
//! Holds the shopper's cart, mirrors it to a key-value store under a single
//! fixed key, and checks every quantity change against the catalog's stock
//! endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rocketshoes_cart::{CartConfig, CartStore, CatalogClient, FileStore, LogNotifier};
//! use rocketshoes_core::ProductId;
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::load(
//!     Arc::new(CatalogClient::new(&config.catalog)?),
//!     Arc::new(FileStore::new(&config.storage_dir)),
//!     Arc::new(LogNotifier),
//!     config.currency,
//! )
//! .await;
//!
//! let cart = store.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod notice;
pub mod storage;
pub mod store;

pub use catalog::{CatalogClient, CatalogError, CatalogProduct, CatalogService, Stock};
pub use config::{CartConfig, CatalogConfig, ConfigError};
pub use error::CartError;
pub use models::{Cart, CartItem, CartLineSummary, CartSummary};
pub use notice::{ChannelNotifier, LogNotifier, Notice, Notifier};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::CartStore;
