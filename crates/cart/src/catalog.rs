//! In-memory product catalog.
//!
//! The catalog is loaded once at startup, either from the built-in seed list
//! or from a JSON document supplied by the host. It is never persisted.

use std::path::Path;

use organic_farm_core::{CurrencyCode, Product};
use rust_decimal::Decimal;

use crate::error::CatalogError;

/// Ordered list of products with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    currency: CurrencyCode,
}

impl Catalog {
    /// Create an empty catalog priced in `currency`.
    #[must_use]
    pub const fn new(currency: CurrencyCode) -> Self {
        Self {
            products: Vec::new(),
            currency,
        }
    }

    /// The products the site ships with.
    #[must_use]
    pub fn seed() -> Self {
        let seed = [
            (
                "p1",
                "Compost 5kg",
                249,
                "Organic compost for vegetables",
                "img/compost 5kg.webp",
            ),
            (
                "p2",
                "Bio-Fertilizer 1L",
                399,
                "Microbial fertilizer",
                "img/biofrtrilizer 1 ltr.jpeg",
            ),
            (
                "p3",
                "Soil Booster 2kg",
                299,
                "Boosts soil nutrients",
                "img/soil boost 2kg.jpg",
            ),
        ];

        let mut catalog = Self::new(CurrencyCode::INR);
        for (id, name, price, description, image_ref) in seed {
            // Seed ids are distinct and prices non-negative.
            if let Ok(product) = Product::new(id, name, Decimal::from(price), description, image_ref) {
                catalog.products.push(product);
            }
        }
        catalog
    }

    /// Parse a JSON array of product records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the document is not an array of valid
    /// products or lists an id twice.
    pub fn from_json(json: &str, currency: CurrencyCode) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        let mut catalog = Self::new(currency);
        for product in products {
            catalog.add_product(product)?;
        }
        Ok(catalog)
    }

    /// Read and parse a JSON catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path, currency: CurrencyCode) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json, currency)?;
        tracing::debug!(path = %path.display(), products = catalog.len(), "Loaded catalog");
        Ok(catalog)
    }

    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    #[must_use]
    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id().as_str() == id)
    }

    /// Products priced at or below `max`.
    pub fn filter_by_max_price(&self, max: Decimal) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.price() <= max)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.products.iter().map(Product::name).collect()
    }

    /// Case-insensitive substring match on product names. A blank query
    /// matches everything.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a Product> {
        let needle = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(move |p| p.name().to_lowercase().contains(&needle))
    }

    /// Append a product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is already listed.
    pub fn add_product(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.find_by_id(product.id().as_str()).is_some() {
            return Err(CatalogError::DuplicateId(product.id().clone()));
        }
        self.products.push(product);
        Ok(())
    }

    /// Remove a product. Cart entries that reference it are left alone and
    /// are valued at zero from then on.
    pub fn remove_product(&mut self, id: &str) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id().as_str() == id)?;
        Some(self.products.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.products.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seed() {
        let catalog = Catalog::seed();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.currency(), CurrencyCode::INR);
        assert_eq!(
            catalog.names(),
            ["Compost 5kg", "Bio-Fertilizer 1L", "Soil Booster 2kg"]
        );
    }

    #[test]
    fn test_find_by_id() {
        let catalog = Catalog::seed();
        assert_eq!(
            catalog.find_by_id("p2").unwrap().price(),
            Decimal::from(399)
        );
        assert!(catalog.find_by_id("p9").is_none());
    }

    #[test]
    fn test_filter_by_max_price() {
        let catalog = Catalog::seed();
        let ids: Vec<&str> = catalog
            .filter_by_max_price(Decimal::from(299))
            .map(|p| p.id().as_str())
            .collect();
        assert_eq!(ids, ["p1", "p3"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = Catalog::seed();
        let hits: Vec<&str> = catalog.search("  SOIL ").map(Product::name).collect();
        assert_eq!(hits, ["Soil Booster 2kg"]);
        assert_eq!(catalog.search("").count(), 3);
        assert_eq!(catalog.search("seeds").count(), 0);
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut catalog = Catalog::seed();
        let dup = Product::new("p1", "Other", Decimal::ONE, "", "").unwrap();
        assert!(matches!(
            catalog.add_product(dup),
            Err(CatalogError::DuplicateId(_))
        ));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_remove_product() {
        let mut catalog = Catalog::seed();
        let removed = catalog.remove_product("p2").unwrap();
        assert_eq!(removed.name(), "Bio-Fertilizer 1L");
        assert!(catalog.remove_product("p2").is_none());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"id": "p1", "name": "Compost 5kg", "price": 249, "description": "Organic compost", "image_ref": "img/c.webp"},
            {"id": "p4", "name": "Neem Cake 1kg", "price": "149.50", "desc": "Natural pest control"}
        ]"#;
        let catalog = Catalog::from_json(json, CurrencyCode::INR).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.find_by_id("p4").unwrap().price(),
            Decimal::new(14_950, 2)
        );
    }

    #[test]
    fn test_from_json_duplicate() {
        let json = r#"[{"id": "p1", "name": "a", "price": 1}, {"id": "p1", "name": "b", "price": 2}]"#;
        assert!(matches!(
            Catalog::from_json(json, CurrencyCode::INR),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_from_json_invalid_record() {
        let json = r#"[{"id": "", "name": "a", "price": 1}]"#;
        assert!(matches!(
            Catalog::from_json(json, CurrencyCode::INR),
            Err(CatalogError::Parse(_))
        ));
    }
}
