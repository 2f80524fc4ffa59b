//! Core types for Organic Farm.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use contact::{ContactError, ContactField, ContactMessage};
pub use email::{Email, EmailError};
pub use id::{ProductId, ProductIdError};
pub use price::{CurrencyCode, Price, parse_amount, round_cents};
pub use product::{Product, ProductError};
