//! Catalog product record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, ProductIdError};

/// Errors that can occur when constructing a [`Product`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product ID is invalid.
    #[error("invalid product id: {0}")]
    InvalidId(#[from] ProductIdError),
    /// The price is below zero.
    #[error("price must not be negative (got {0})")]
    NegativePrice(Decimal),
}

/// A product offered in the catalog.
///
/// Products are immutable once constructed; the catalog owns them for the
/// lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    name: String,
    price: Decimal,
    description: String,
    image_ref: String,
}

/// Wire shape of a product record. Accepts the short field names used by the
/// site's seed data (`desc`, `img`).
#[derive(Deserialize)]
struct ProductRecord {
    id: String,
    name: String,
    price: Decimal,
    #[serde(default, alias = "desc")]
    description: String,
    #[serde(default, alias = "img")]
    image_ref: String,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Self::new(
            &record.id,
            record.name,
            record.price,
            record.description,
            record.image_ref,
        )
    }
}

impl Product {
    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is blank or the price is negative.
    pub fn new(
        id: &str,
        name: impl Into<String>,
        price: Decimal,
        description: impl Into<String>,
        image_ref: impl Into<String>,
    ) -> Result<Self, ProductError> {
        let id = ProductId::parse(id)?;
        if price < Decimal::ZERO {
            return Err(ProductError::NegativePrice(price));
        }
        Ok(Self {
            id,
            name: name.into(),
            price,
            description: description.into(),
            image_ref: image_ref.into(),
        })
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price in the catalog's currency.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Image path or URL shown in product cards and quick view.
    #[must_use]
    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }
}
