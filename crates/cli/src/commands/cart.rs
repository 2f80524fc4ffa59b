//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! of-cli cart add p1 -q 2
//! of-cli cart remove p1
//! of-cli cart clear
//! of-cli cart show
//! ```
//!
//! # Environment Variables
//!
//! - `OF_CART_PATH` - Storage document location
//! - `OF_QUANTITY_POLICY` - `reject` turns a non-positive or oversized quantity into an error

use std::fmt::Write;

use organic_farm_cart::{CartError, CartStore, CartTotal, Catalog};
use organic_farm_core::Price;

/// Add units of a product and render the updated cart.
///
/// # Errors
///
/// Returns [`CartError`] if the store rejects the input.
pub fn add(
    store: &CartStore,
    catalog: &Catalog,
    product_id: &str,
    quantity: i64,
) -> Result<String, CartError> {
    if catalog.find_by_id(product_id.trim()).is_none() {
        tracing::warn!(product_id, "Product is not in the catalog, it will be valued at zero");
    }
    let state = store.add_item(product_id, quantity)?;
    Ok(render(&organic_farm_cart::project(&state, catalog), store))
}

/// Remove a product and render the updated cart.
pub fn remove(store: &CartStore, catalog: &Catalog, product_id: &str) -> String {
    let state = store.remove_item(product_id);
    render(&organic_farm_cart::project(&state, catalog), store)
}

/// Empty the cart.
pub fn clear(store: &CartStore, catalog: &Catalog) -> String {
    let state = store.clear();
    render(&organic_farm_cart::project(&state, catalog), store)
}

/// Render the current cart.
pub fn show(store: &CartStore, catalog: &Catalog) -> String {
    render(&store.total(catalog), store)
}

fn render(total: &CartTotal, store: &CartStore) -> String {
    let mut out = render_total(total);
    if !store.is_durable() {
        out.push_str("\n(cart could not be saved; changes last until exit)");
    }
    out
}

/// Format cart lines and the grand total.
pub fn render_total(total: &CartTotal) -> String {
    if total.lines.is_empty() {
        return "Cart is empty".to_string();
    }

    let money = |amount| Price::new(amount, total.currency).display();
    let mut out = String::new();
    for line in &total.lines {
        let name = line.name.as_deref().unwrap_or("(not in catalog)");
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{name} [{}]  {} x {} = {}",
            line.product_id,
            line.quantity,
            money(line.unit_price),
            money(line.line_total),
        );
    }
    let _ = write!(
        out,
        "Total ({} items): {}",
        total.item_count(),
        total.grand_total_price().display()
    );
    out
}
