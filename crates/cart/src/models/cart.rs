//! Cart and cart line types.

use rocketshoes_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProduct;

/// A product in the cart with the quantity the shopper wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub amount: u32,
    pub image: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub title: String,
}

impl CartItem {
    /// Build a cart line from catalog details.
    ///
    /// The line is keyed by `id`, the id the shopper asked for.
    #[must_use]
    pub fn from_catalog(id: ProductId, product: CatalogProduct, amount: u32) -> Self {
        Self {
            id,
            amount,
            image: product.image,
            price: product.price,
            title: product.title,
        }
    }
}

/// The shopper's cart: at most one line per product id.
///
/// Mutating methods return a new cart and leave `self` untouched, so the
/// store can persist the candidate before committing it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw lines, restoring the one-line-per-id invariant.
    ///
    /// Repeated ids merge into the first occurrence with their amounts
    /// summed; lines with a zero amount are dropped.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::new();
        for item in items {
            if item.amount == 0 {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => existing.amount = existing.amount.saturating_add(item.amount),
                None => merged.push(item),
            }
        }
        Self { items: merged }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Iterate over lines.
    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line for `id`.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cart holds `id`.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    /// A cart with `item` appended, or merged into an existing line for the
    /// same id.
    #[must_use]
    pub fn with_item(&self, item: CartItem) -> Self {
        Self::from_items(self.items.iter().cloned().chain(std::iter::once(item)))
    }

    /// A cart where the line for `id` has `amount`. Unknown ids leave the
    /// lines unchanged.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    CartItem {
                        amount,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Self { items }
    }

    /// A cart without the line for `id`.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Self {
        let items = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
