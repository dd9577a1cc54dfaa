//! Subcommand implementations.

pub mod cart;
