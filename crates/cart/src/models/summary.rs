//! Derived totals for cart pages and header badges.

use std::collections::HashMap;

use rocketshoes_core::{CurrencyCode, Price, ProductId};

use super::Cart;

/// One cart line with its computed subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineSummary {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub amount: u32,
    pub unit_price: Price,
    pub subtotal: Price,
}

/// Totals derived from a cart snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<CartLineSummary>,
    pub total: Price,
    /// Distinct products (the header badge count).
    pub size: usize,
    /// Sum of all line amounts.
    pub item_count: u32,
}

impl CartSummary {
    /// Summarize `cart`, pricing every line in `currency`.
    #[must_use]
    pub fn of(cart: &Cart, currency: CurrencyCode) -> Self {
        let lines: Vec<CartLineSummary> = cart
            .iter()
            .map(|item| {
                let unit_price = Price::new(item.price, currency);
                CartLineSummary {
                    id: item.id,
                    title: item.title.clone(),
                    image: item.image.clone(),
                    amount: item.amount,
                    unit_price,
                    subtotal: unit_price.times(item.amount),
                }
            })
            .collect();

        let total = lines
            .iter()
            .fold(Price::zero(currency), |acc, line| acc.saturating_add(line.subtotal));
        let item_count = lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.amount));

        Self {
            size: lines.len(),
            lines,
            total,
            item_count,
        }
    }

    /// Amount held for each product, for badges on a product grid.
    #[must_use]
    pub fn amounts(&self) -> HashMap<ProductId, u32> {
        self.lines.iter().map(|line| (line.id, line.amount)).collect()
    }

    /// Amount held for `id`, zero when absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.id == id)
            .map_or(0, |line| line.amount)
    }
}
