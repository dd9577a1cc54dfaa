//! Cart domain models.

mod cart;
mod summary;

pub use cart::{Cart, CartItem};
pub use summary::{CartLineSummary, CartSummary};
