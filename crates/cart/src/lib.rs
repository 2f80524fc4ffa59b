//! Organic Farm Cart - persisted cart store and totals.
//!
//! # Architecture
//!
//! - [`Catalog`] holds the product list in memory; it is loaded once at
//!   startup and never persisted.
//! - [`CartStore`] owns the product-quantity mapping, persisted as a single
//!   JSON blob under one key of a string key-value [`Storage`].
//! - [`project`] derives a [`CartTotal`] from a [`CartState`] and the catalog.
//!   Totals are recomputed on every call, never cached.
//!
//! Every store mutation performs one storage write and then notifies
//! subscribers with the new state. Storage failures never reach the caller:
//! the store falls back to an in-memory cart for the rest of the session.
//!
//! # Example
//!
//! ```
//! use organic_farm_cart::{CartStore, Catalog, MemoryStorage};
//! use rust_decimal::Decimal;
//!
//! let catalog = Catalog::seed();
//! let store = CartStore::new(MemoryStorage::new());
//!
//! store.add_item("p1", 2).unwrap();
//! store.add_item("p2", 1).unwrap();
//!
//! let total = store.total(&catalog);
//! assert_eq!(total.grand_total, Decimal::new(897, 0));
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod projection;
pub mod state;
pub mod storage;
pub mod store;

pub use catalog::Catalog;
pub use config::CartConfig;
pub use error::{CartError, CatalogError, ConfigError, MalformedCartData, StorageError};
pub use projection::{CartTotal, CartTotalLine, project};
pub use state::CartState;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{CartStore, QuantityPolicy, SubscriptionId};
