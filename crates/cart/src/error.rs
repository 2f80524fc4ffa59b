//! Error types for the cart crate.
//!
//! Only [`CartError`] and [`CatalogError`] reach callers of the public
//! operations. [`StorageError`] and [`MalformedCartData`] are produced
//! internally and recovered from inside [`CartStore`](crate::CartStore).

use organic_farm_core::ProductId;
use thiserror::Error;

/// Errors raised by a [`Storage`](crate::Storage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization of the stored document failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend refuses reads or writes (disabled, quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A persisted cart blob that cannot be used.
#[derive(Debug, Error)]
pub enum MalformedCartData {
    /// Not JSON, or not an object of product id to integer quantity.
    #[error("cart data is not a product-quantity object: {0}")]
    Shape(#[from] serde_json::Error),

    /// Written by a newer format version.
    #[error("unsupported cart data version {0}")]
    UnsupportedVersion(u32),

    /// A quantity below one.
    #[error("quantity for {product_id} must be positive (got {quantity})")]
    NonPositiveQuantity {
        /// Offending entry.
        product_id: ProductId,
        /// Stored value.
        quantity: i64,
    },
}

/// Input rejected by a cart operation under [`QuantityPolicy::Reject`](crate::QuantityPolicy::Reject).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity was zero or negative.
    #[error("quantity must be a positive integer (got {0})")]
    InvalidQuantity(i64),

    /// Quantity does not fit the cart's `u32` counters.
    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),

    /// Product id was blank.
    #[error("product id cannot be empty")]
    EmptyProductId,
}

/// Errors that can occur when building a [`Catalog`](crate::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product with this id is already listed.
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),

    /// The catalog document could not be parsed, or a record failed
    /// validation (blank id, negative price).
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog file could not be read.
    #[error("catalog read error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}
