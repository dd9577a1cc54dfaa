//! Cart commands.
//!
//! Each command opens the persisted cart, runs one store operation, and
//! prints the resulting cart. Notices raised by the store are printed to
//! stderr before the cart.
//!
//! # Environment Variables
//!
//! - `ROCKETSHOES_API_URL` - Catalog/stock API base URL
//! - `ROCKETSHOES_API_TOKEN` - Optional bearer token for the API
//! - `ROCKETSHOES_STORAGE_DIR` - Directory holding the persisted cart
//! - `ROCKETSHOES_CURRENCY` - Currency used for totals

use std::sync::Arc;

use rocketshoes_cart::{
    CartConfig, CartError, CartStore, CartSummary, CatalogClient, CatalogError, ChannelNotifier,
    ConfigError, FileStore, Notice,
};
use rocketshoes_core::ProductId;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The catalog client could not be built.
    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    /// The store rejected the operation.
    #[error("{0}")]
    Cart(#[from] CartError),
}

/// An opened cart plus the notices it raises.
pub struct Session {
    store: CartStore,
    notices: UnboundedReceiver<Notice>,
}

impl Session {
    /// Open the cart described by the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the catalog
    /// client cannot be built.
    pub async fn open() -> Result<Self, CommandError> {
        let config = CartConfig::from_env()?;
        debug!(config = ?config, "Loaded configuration");

        let catalog = CatalogClient::new(&config.catalog)?;
        let (notifier, notices) = ChannelNotifier::channel();
        let store = CartStore::load(
            Arc::new(catalog),
            Arc::new(FileStore::new(&config.storage_dir)),
            Arc::new(notifier),
            config.currency,
        )
        .await;

        info!(storage_dir = %config.storage_dir.display(), "Cart opened");
        Ok(Self { store, notices })
    }

    /// Print every notice raised since the last call.
    #[allow(clippy::print_stderr)]
    fn flush_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            eprintln!("! {notice}");
        }
    }

    /// Print the cart with totals.
    async fn print_cart(&mut self) {
        self.flush_notices();
        print_summary(&self.store.summary().await);
    }

    /// Finish a mutation: relay notices, then print the cart or fail.
    async fn finish<T>(&mut self, result: Result<T, CartError>) -> Result<(), CommandError> {
        self.print_cart().await;
        result.map(|_| ()).map_err(CommandError::from)
    }

    /// `list`: show the cart.
    pub async fn list(&mut self) {
        self.print_cart().await;
    }

    /// `add <id>`: add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns the store error if the add was rejected.
    pub async fn add(&mut self, id: ProductId) -> Result<(), CommandError> {
        let result = self.store.add_product(id).await;
        self.finish(result).await
    }

    /// `remove <id>`: drop a product line.
    ///
    /// # Errors
    ///
    /// Returns the store error if the removal could not be persisted.
    pub async fn remove(&mut self, id: ProductId) -> Result<(), CommandError> {
        let result = self.store.remove_product(id).await;
        self.finish(result).await
    }

    /// `update <id> <amount>`: set a line's amount.
    ///
    /// # Errors
    ///
    /// Returns the store error if the change was rejected.
    pub async fn update(&mut self, id: ProductId, amount: u32) -> Result<(), CommandError> {
        let result = self.store.update_product_amount(id, amount).await;
        self.finish(result).await
    }

    /// `summary`: show only the totals.
    #[allow(clippy::print_stdout)]
    pub async fn summary(&mut self) {
        self.flush_notices();
        let summary = self.store.summary().await;
        println!("Products: {}", summary.size);
        println!("Items:    {}", summary.item_count);
        println!("Total:    {}", summary.total);
    }
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &CartSummary) {
    if summary.lines.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in &summary.lines {
        println!(
            "{:<6} {:<32} {:>4} x {:>12} = {:>12}",
            format!("#{}", line.id),
            line.title,
            line.amount,
            line.unit_price.display(),
            line.subtotal.display()
        );
    }
    println!("Total: {}", summary.total);
}
