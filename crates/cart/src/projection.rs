//! Cart totals derived from cart contents and the catalog.

use organic_farm_core::{CurrencyCode, Price, ProductId, round_cents};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::state::CartState;

/// One priced cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotalLine {
    pub product_id: ProductId,
    /// Catalog name, `None` when the product is not listed.
    pub name: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl CartTotalLine {
    /// Whether the product resolved against the catalog.
    #[must_use]
    pub const fn is_listed(&self) -> bool {
        self.name.is_some()
    }
}

/// Priced view of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartTotal {
    pub lines: Vec<CartTotalLine>,
    pub grand_total: Decimal,
    pub currency: CurrencyCode,
}

impl CartTotal {
    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub const fn grand_total_price(&self) -> Price {
        Price::new(self.grand_total, self.currency)
    }
}

/// Price every entry of `state` against `catalog`.
///
/// Lines follow the cart's iteration order. Products missing from the
/// catalog are priced at zero instead of failing the projection. Unit
/// prices, line totals, and the grand total are each rounded to cents.
#[must_use]
pub fn project(state: &CartState, catalog: &Catalog) -> CartTotal {
    let lines: Vec<CartTotalLine> = state
        .iter()
        .map(|(product_id, quantity)| {
            let product = catalog.find_by_id(product_id.as_str());
            let unit_price = round_cents(product.map_or(Decimal::ZERO, |p| p.price()));
            CartTotalLine {
                product_id: product_id.clone(),
                name: product.map(|p| p.name().to_owned()),
                quantity,
                unit_price,
                line_total: round_cents(unit_price * Decimal::from(quantity)),
            }
        })
        .collect();

    let grand_total = round_cents(lines.iter().map(|l| l.line_total).sum());

    CartTotal {
        lines,
        grand_total,
        currency: catalog.currency(),
    }
}
