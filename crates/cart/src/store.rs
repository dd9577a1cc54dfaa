//! The cart store.
//!
//! Holds the authoritative cart, mirrors it to a [`KeyValueStore`] under
//! [`CART_STORAGE_KEY`], and checks amount changes against the catalog's
//! stock endpoint.
//!
//! Every mutation computes a candidate cart, persists it, and only then
//! commits it in memory. A failed step leaves both copies at the last
//! persisted value and surfaces a [`Notice`]. Mutations are serialized by a
//! lock held for the whole operation.

use std::sync::Arc;

use rocketshoes_core::{CurrencyCode, ProductId};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::catalog::CatalogService;
use crate::codec::{self, CART_STORAGE_KEY};
use crate::error::CartError;
use crate::models::{Cart, CartItem, CartSummary};
use crate::notice::{Notice, Notifier};
use crate::storage::KeyValueStore;

/// Shared handle to the cart.
///
/// Cheap to clone; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    catalog: Arc<dyn CatalogService>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    currency: CurrencyCode,
    cart: Mutex<Cart>,
}

impl CartStore {
    /// Create a store, restoring the cart persisted under [`CART_STORAGE_KEY`].
    ///
    /// A missing, unreadable, or unparseable value starts an empty cart.
    #[instrument(skip_all)]
    pub async fn load(
        catalog: Arc<dyn CatalogService>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        currency: CurrencyCode,
    ) -> Self {
        let raw = match storage.get_item(CART_STORAGE_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart, starting empty");
                None
            }
        };
        let cart = codec::decode(raw.as_deref());
        info!(lines = cart.len(), "Cart restored");

        Self {
            inner: Arc::new(CartStoreInner {
                catalog,
                storage,
                notifier,
                currency,
                cart: Mutex::new(cart),
            }),
        }
    }

    /// Snapshot of the current cart.
    pub async fn cart(&self) -> Cart {
        self.inner.cart.lock().await.clone()
    }

    /// Totals for the current cart.
    pub async fn summary(&self) -> CartSummary {
        let cart = self.inner.cart.lock().await;
        CartSummary::of(&cart, self.inner.currency)
    }

    /// Add one unit of `product_id`.
    ///
    /// A product already in the cart goes through
    /// [`update_product_amount`](Self::update_product_amount) with its amount
    /// plus one, so the stock ceiling applies. A new product is appended with
    /// amount 1.
    ///
    /// # Errors
    ///
    /// Returns an error (after notifying) if the catalog lookup, the stock
    /// check, or the storage write fails. The cart is unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut cart = self.inner.cart.lock().await;

        let product = match self.inner.catalog.product(product_id).await {
            Ok(product) => product,
            Err(e) => {
                error!(error = %e, "Product lookup failed");
                return Err(self.fail(Notice::ProductAddFailed, e.into()));
            }
        };

        if let Some(existing) = cart.find(product_id) {
            let amount = existing.amount.saturating_add(1);
            return self.change_amount(&mut cart, product_id, amount).await;
        }

        let next = cart.with_item(CartItem::from_catalog(product_id, product, 1));
        if let Err(e) = self.persist(&next).await {
            error!(error = %e, "Failed to persist cart after add");
            return Err(self.fail(Notice::ProductAddFailed, e));
        }

        *cart = next.clone();
        info!(lines = next.len(), "Product added");
        Ok(next)
    }

    /// Remove `product_id` from the cart.
    ///
    /// Removing a product that is not in the cart leaves it unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error (after notifying) if the storage write fails. The
    /// cart is unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let mut cart = self.inner.cart.lock().await;

        let next = cart.without(product_id);
        if let Err(e) = self.persist(&next).await {
            error!(error = %e, "Failed to persist cart after removal");
            return Err(self.fail(Notice::ProductRemovalFailed, e));
        }

        *cart = next.clone();
        info!(lines = next.len(), "Product removed");
        Ok(next)
    }

    /// Set the amount of `product_id` to `amount`, bounded by current stock.
    ///
    /// # Errors
    ///
    /// Returns an error (after notifying) if `amount` is zero, exceeds the
    /// stock ceiling, or the stock lookup or storage write fails. The cart is
    /// unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<Cart, CartError> {
        let mut cart = self.inner.cart.lock().await;
        self.change_amount(&mut cart, product_id, amount).await
    }

    /// Stock-checked amount change on an already locked cart.
    async fn change_amount(
        &self,
        cart: &mut Cart,
        product_id: ProductId,
        amount: u32,
    ) -> Result<Cart, CartError> {
        if amount < 1 {
            warn!(amount, "Rejected non-positive amount");
            return Err(self.fail(Notice::AmountChangeFailed, CartError::InvalidAmount(amount)));
        }

        let stock = match self.inner.catalog.stock(product_id).await {
            Ok(stock) => stock,
            Err(e) => {
                error!(error = %e, "Stock lookup failed");
                return Err(self.fail(Notice::AmountChangeFailed, e.into()));
            }
        };

        if !stock.allows(amount) {
            warn!(requested = amount, available = stock.amount, "Insufficient stock");
            return Err(self.fail(
                Notice::InsufficientStock,
                CartError::InsufficientStock {
                    product_id,
                    requested: amount,
                    available: stock.amount,
                },
            ));
        }

        let next = cart.with_amount(product_id, amount);
        if let Err(e) = self.persist(&next).await {
            error!(error = %e, "Failed to persist cart after amount change");
            return Err(self.fail(Notice::AmountChangeFailed, e));
        }

        *cart = next.clone();
        info!(amount, "Product amount updated");
        Ok(next)
    }

    /// Write `cart` to the key-value store.
    async fn persist(&self, cart: &Cart) -> Result<(), CartError> {
        let encoded = codec::encode(cart)?;
        self.inner
            .storage
            .set_item(CART_STORAGE_KEY, &encoded)
            .await?;
        Ok(())
    }

    /// Surface `notice` and hand `err` back to the caller.
    fn fail(&self, notice: Notice, err: CartError) -> CartError {
        self.inner.notifier.notify(notice);
        err
    }
}
