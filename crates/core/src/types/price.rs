//! Type-safe price representation using decimal arithmetic.
//!
//! All monetary rounding in Organic Farm goes through [`round_cents`], which
//! rounds half-up to two decimal places. Amounts are never negative, so
//! "half away from zero" and "half up" coincide.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round an amount to whole cents (2 decimal places), half-up.
///
/// ```
/// use organic_farm_core::round_cents;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_cents(Decimal::new(10_005, 3)), Decimal::new(1_001, 2));
/// ```
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Extract a numeric amount from display text such as `"₹1,249.50"`.
///
/// Every character other than ASCII digits, `.` and `-` is discarded. Text
/// that does not leave a valid number yields zero.
#[must_use]
pub fn parse_amount(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from an amount in the smallest currency unit.
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// Format for display with two decimals (e.g., "₹897.00").
    #[must_use]
    pub fn display(&self) -> String {
        let mut amount = round_cents(self.amount);
        amount.rescale(2);
        format!("{}{amount}", self.currency_code.symbol())
    }

    /// Apply a percentage discount, rounding the result to cents.
    ///
    /// A percentage outside `0..=100` leaves the price unchanged.
    #[must_use]
    pub fn apply_discount(self, percent: Decimal) -> Self {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return self;
        }
        let factor = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
        Self::new(round_cents(self.amount * factor), self.currency_code)
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}
