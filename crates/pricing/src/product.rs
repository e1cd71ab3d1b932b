//! Product pricing snapshot as served by the catalog API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitrine_core::{CategoryId, DomainError, Money, ProductId};

/// Professional (contractual) rate attached to a product.
///
/// The upstream catalog serves these with optional fields; anything missing
/// simply disqualifies the rate at resolution time, it is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalDiscount {
    pub is_active: bool,
    /// Category the rate is negotiated for; must match the product's.
    pub applicable_category_id: CategoryId,
    pub percentage: Option<Decimal>,
    pub discounted_price_excl_tax: Option<Money>,
    pub discounted_price_incl_tax: Option<Money>,
}

/// Time-limited marketing promotion attached to a product.
///
/// Only the tax-inclusive price is authoritative; the tax-exclusive price is
/// derived at resolution time from the configured VAT multiplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub is_active: bool,
    pub discounted_price_incl_tax: Option<Money>,
    pub percentage: Option<Decimal>,
    pub expires_at: DateTime<Utc>,
}

/// One product's pricing snapshot.
///
/// Resolution is recomputed from this value on every use; nothing here is
/// ever mutated or persisted by the pricing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPricing {
    pub product_id: ProductId,
    pub category_id: CategoryId,
    pub base_price_excl_tax: Money,
    pub base_price_incl_tax: Money,
    pub professional_discount: Option<ProfessionalDiscount>,
    pub promotion: Option<Promotion>,
}

impl ProductPricing {
    /// Validate the base-price invariants of the snapshot.
    ///
    /// Discount sub-records are deliberately not validated here: incomplete
    /// discount data is an expected state and is handled tier-by-tier during
    /// resolution.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.base_price_excl_tax.is_negative() || self.base_price_incl_tax.is_negative() {
            return Err(DomainError::validation("base prices must not be negative"));
        }
        if self.base_price_incl_tax < self.base_price_excl_tax {
            return Err(DomainError::invariant(
                "base_price_incl_tax must be >= base_price_excl_tax",
            ));
        }
        Ok(())
    }
}
