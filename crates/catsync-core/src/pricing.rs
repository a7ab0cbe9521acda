//! Cost parsing and the minimum-price floor.
//!
//! The master sheet has no price column, so the cost doubles as the price.
//! Malformed or non-positive costs never fail a row: they read as zero and
//! the price falls back to the configured minimum.

use std::str::FromStr;

use rust_decimal::Decimal;

/// A row's cost and the price that will be sent for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostPrice {
    /// Parsed cost; zero when the cell was blank, malformed, or not positive.
    pub cost: Decimal,
    pub price: String,
}

impl CostPrice {
    /// Whether the inventory cost should be written.
    #[must_use]
    pub fn has_cost(&self) -> bool {
        self.cost > Decimal::ZERO
    }

    /// Cost rendered for the inventory item, scale preserved (`"12.50"`).
    #[must_use]
    pub fn cost_string(&self) -> String {
        self.cost.to_string()
    }
}

/// Parses a raw cost cell (thousands separators allowed) into cost and price.
#[must_use]
pub fn price_from_cost(raw: &str, min_price: Decimal) -> CostPrice {
    match parse_positive(raw) {
        Some(cost) => CostPrice {
            cost,
            price: cost.to_string(),
        },
        None => CostPrice {
            cost: Decimal::ZERO,
            price: min_price.to_string(),
        },
    }
}

/// Applies the minimum-price floor to an outgoing price string.
#[must_use]
pub fn floor_price(price: &str, min_price: Decimal) -> String {
    parse_positive(price).map_or_else(|| min_price.to_string(), |p| p.to_string())
}

fn parse_positive(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace(',', "");
    Decimal::from_str(cleaned.trim())
        .ok()
        .filter(|value| *value > Decimal::ZERO)
}
