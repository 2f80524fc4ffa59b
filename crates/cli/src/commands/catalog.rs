//! Catalog browsing commands.

use std::fmt::Write;

use organic_farm_cart::Catalog;
use organic_farm_core::{Price, Product};
use rust_decimal::Decimal;

/// List products, optionally capped at `max_price`.
pub fn list(catalog: &Catalog, max_price: Option<Decimal>) -> String {
    match max_price {
        Some(max) => render(catalog, catalog.filter_by_max_price(max)),
        None => render(catalog, catalog.iter()),
    }
}

/// Products whose name contains `query`, ignoring case.
pub fn search(catalog: &Catalog, query: &str) -> String {
    render(catalog, catalog.search(query))
}

fn render<'a>(catalog: &Catalog, products: impl Iterator<Item = &'a Product>) -> String {
    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:<4} {:<20} {:>9}  {}",
            product.id(),
            product.name(),
            Price::new(product.price(), catalog.currency()).display(),
            product.description()
        );
    }
    if out.is_empty() {
        return "No matching products".to_string();
    }
    out.truncate(out.trim_end().len());
    out
}
