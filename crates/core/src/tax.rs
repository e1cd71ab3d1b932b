//! Tax configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::money::Money;

/// Tax configuration for price derivations.
///
/// The storefront operates in a single market with one VAT rate, so a single
/// multiplier is enough. It is injected wherever a tax-inclusive price has to
/// be converted back to a tax-exclusive one, instead of being a literal at
/// the call site.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConfig {
    /// Multiplier from excl-tax to incl-tax (e.g. `1.20` for 20% VAT).
    multiplier: Decimal,
}

impl TaxConfig {
    /// Build a tax config from an excl-to-incl multiplier.
    ///
    /// The multiplier must be >= 1 (a tax cannot make a price shrink).
    pub fn new(multiplier: Decimal) -> Result<Self, DomainError> {
        if multiplier < Decimal::ONE {
            return Err(DomainError::validation(format!(
                "tax multiplier must be >= 1, got {multiplier}"
            )));
        }
        Ok(Self { multiplier })
    }

    /// Standard 20% VAT, the rate the storefront currently ships with.
    pub fn standard_vat() -> Self {
        Self {
            multiplier: Decimal::new(120, 2),
        }
    }

    pub fn multiplier(&self) -> Decimal {
        self.multiplier
    }

    /// Derive the tax-exclusive amount from a tax-inclusive one.
    pub fn excl_from_incl(&self, incl: Money) -> Money {
        incl.checked_div(self.multiplier)
    }
}

impl Default for TaxConfig {
    fn default() -> Self {
        Self::standard_vat()
    }
}
