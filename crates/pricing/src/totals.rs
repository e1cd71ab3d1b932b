//! Basket totals for carts, quotes, and reservations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitrine_core::Money;

use crate::resolver::DiscountResolution;

/// One basket line: a resolved unit price and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub resolution: DiscountResolution,
    pub quantity: u32,
}

impl PricedLine {
    pub fn new(resolution: DiscountResolution, quantity: u32) -> Self {
        Self {
            resolution,
            quantity,
        }
    }

    pub fn total_excl_tax(&self) -> Money {
        self.resolution.unit_price_excl_tax * Decimal::from(self.quantity)
    }

    pub fn total_incl_tax(&self) -> Money {
        self.resolution.unit_price_incl_tax * Decimal::from(self.quantity)
    }

    pub fn savings_excl_tax(&self) -> Money {
        self.resolution.savings_excl_tax * Decimal::from(self.quantity)
    }
}

/// Aggregated totals over a set of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketTotals {
    pub total_excl_tax: Money,
    pub total_incl_tax: Money,
    pub total_savings_excl_tax: Money,
    /// Sum of line quantities, not the number of lines.
    pub item_count: u64,
}

impl BasketTotals {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a PricedLine>) -> Self {
        let mut totals = BasketTotals::default();
        for line in lines {
            totals.total_excl_tax += line.total_excl_tax();
            totals.total_incl_tax += line.total_incl_tax();
            totals.total_savings_excl_tax += line.savings_excl_tax();
            totals.item_count += u64::from(line.quantity);
        }
        totals
    }
}

/// Average incl-tax unit price across a basket.
///
/// An empty basket (total quantity zero) averages to zero rather than
/// dividing by zero.
pub fn average_unit_price_incl_tax<'a>(lines: impl IntoIterator<Item = &'a PricedLine>) -> Money {
    let totals = BasketTotals::from_lines(lines);
    totals
        .total_incl_tax
        .checked_div(Decimal::from(totals.item_count))
}
