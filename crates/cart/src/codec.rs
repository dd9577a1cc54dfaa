//! Persisted cart format.
//!
//! The cart lives under [`CART_STORAGE_KEY`] as a JSON array of lines:
//!
//! ```json
//! [{ "id": 1, "amount": 2, "image": "https://...", "price": 139.9, "title": "..." }]
//! ```
//!
//! Decoding is lenient. A versioned envelope `{"version": n, "items": [...]}`
//! is accepted alongside the bare array, unknown fields are ignored, lines
//! that fail to parse are skipped, and anything else decodes to an empty cart.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Cart, CartItem};

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCart {
    Lines(Vec<Value>),
    Versioned {
        #[serde(default)]
        version: u32,
        items: Vec<Value>,
    },
}

/// Serialize a cart for storage.
///
/// # Errors
///
/// Returns an error if a line cannot be represented as JSON (e.g. a price
/// outside the `f64` range).
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(cart)
}

/// Deserialize a stored cart; missing or unparseable data yields an empty cart.
#[must_use]
pub fn decode(raw: Option<&str>) -> Cart {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Cart::new();
    };

    let lines = match serde_json::from_str::<StoredCart>(raw) {
        Ok(StoredCart::Lines(lines)) => lines,
        Ok(StoredCart::Versioned { version, items }) => {
            tracing::debug!(version, "Decoding versioned cart");
            items
        }
        Err(e) => {
            warn!(error = %e, "Stored cart is unreadable, starting empty");
            return Cart::new();
        }
    };

    let items = lines
        .into_iter()
        .filter_map(|line| match serde_json::from_value::<CartItem>(line) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable cart line");
                None
            }
        });

    Cart::from_items(items)
}
