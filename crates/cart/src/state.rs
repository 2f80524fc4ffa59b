//! Cart contents and their persisted encoding.
//!
//! # Blob format
//!
//! ```json
//! {"version": 1, "saved_at": "2026-10-19T08:00:00Z", "items": {"p1": 2, "p2": 1}}
//! ```
//!
//! The unversioned form written by earlier site builds (`{"p1": 2}`) is still
//! accepted on read. Writes always produce the current version.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use organic_farm_core::ProductId;
use serde::{Deserialize, Serialize};

use crate::error::MalformedCartData;

/// Current blob format version.
pub const BLOB_VERSION: u32 = 1;

/// Product id to quantity mapping.
///
/// Every stored quantity is at least one; removing a product deletes its
/// entry. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    items: IndexMap<ProductId, u32>,
}

impl CartState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantity held for `product_id`, zero when absent.
    #[must_use]
    pub fn quantity(&self, product_id: &str) -> u32 {
        self.items.get(product_id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.items.contains_key(product_id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.values().map(|&q| u64::from(q)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductId, u32)> {
        self.items.iter().map(|(id, &q)| (id, q))
    }

    /// Add `quantity` to the entry for `product_id`, creating it if absent.
    /// Saturates at `u32::MAX`. Returns the new quantity.
    pub(crate) fn add(&mut self, product_id: ProductId, quantity: u32) -> u32 {
        let entry = self.items.entry(product_id).or_insert(0);
        *entry = entry.saturating_add(quantity);
        *entry
    }

    /// Delete the entry for `product_id`, returning its quantity.
    pub(crate) fn remove(&mut self, product_id: &str) -> Option<u32> {
        self.items.shift_remove(product_id)
    }
}

impl<'a> IntoIterator for &'a CartState {
    type Item = (&'a ProductId, &'a u32);
    type IntoIter = indexmap::map::Iter<'a, ProductId, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Serialize)]
struct BlobOut<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    items: &'a IndexMap<ProductId, u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BlobIn {
    Versioned {
        version: u32,
        items: IndexMap<ProductId, i64>,
    },
    Legacy(IndexMap<ProductId, i64>),
}

/// Encode a cart as a current-version blob.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn encode(state: &CartState) -> Result<String, serde_json::Error> {
    serde_json::to_string(&BlobOut {
        version: BLOB_VERSION,
        saved_at: Utc::now(),
        items: &state.items,
    })
}

/// Decode a persisted blob.
///
/// # Errors
///
/// Returns [`MalformedCartData`] if the blob is not JSON, is not a mapping of
/// product id to integer quantity, carries an unknown version, or holds a
/// quantity below one.
pub fn decode(raw: &str) -> Result<CartState, MalformedCartData> {
    let items = match serde_json::from_str::<BlobIn>(raw)? {
        BlobIn::Versioned { version, items } => {
            if version != BLOB_VERSION {
                return Err(MalformedCartData::UnsupportedVersion(version));
            }
            items
        }
        BlobIn::Legacy(items) => items,
    };

    let mut state = CartState::new();
    for (product_id, quantity) in items {
        if quantity < 1 {
            return Err(MalformedCartData::NonPositiveQuantity {
                product_id,
                quantity,
            });
        }
        let quantity = u32::try_from(quantity).unwrap_or_else(|_| {
            tracing::warn!(%product_id, quantity, "Stored cart quantity capped at {}", u32::MAX);
            u32::MAX
        });
        state.add(product_id, quantity);
    }
    Ok(state)
}
