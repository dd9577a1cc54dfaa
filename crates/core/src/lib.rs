//! RocketShoes Core - Shared types library.
//!
//! This crate provides common types used across all RocketShoes components:
//! - `cart` - Cart store, catalog client, and persistence
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
