//! Organic Farm Core - Shared types library.
//!
//! This crate provides common types used across all Organic Farm components:
//! - `cart` - Catalog, cart store, and cart projection
//! - `cli` - Command-line host for cart and catalog operations
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no storage,
//! no logging. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, emails, products,
//!   and contact messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
