//! Discount resolution.
//!
//! Tiers are an ordered list of evaluators, tried in fixed priority order
//! until one matches. Adding a future tier (e.g. loyalty pricing) is an
//! insertion into [`TIERS`], not a restructuring of conditionals.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vitrine_core::{Money, TaxConfig};

use crate::product::ProductPricing;

/// Which discount tier won the resolution.
///
/// This also serves as the badge discriminator the UI renders next to the
/// price (pro rate / promo / nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    None,
    Professional,
    Promotion,
}

/// Outcome of resolving one product snapshot.
///
/// Purely derived data: recomputed on every use, never persisted, identical
/// for identical inputs (including `now`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountResolution {
    pub kind: DiscountKind,
    pub unit_price_excl_tax: Money,
    pub unit_price_incl_tax: Money,
    /// Discount percentage applied, `None` when `kind` is `None`.
    pub percentage: Option<Decimal>,
    /// `base_price_excl_tax - unit_price_excl_tax`, never negative.
    pub savings_excl_tax: Money,
}

/// A tier evaluator: returns `Some` when its discount applies, `None` to let
/// the next tier have a look. Evaluators are pure.
type TierEvaluator = fn(&ProductPricing, DateTime<Utc>, &TaxConfig) -> Option<DiscountResolution>;

/// Tiers in priority order. First match wins; at most one discount is ever
/// applied to a resolution.
const TIERS: &[TierEvaluator] = &[professional_tier, promotion_tier];

/// Resolve the price to charge for one product snapshot.
///
/// Never fails: a product with no eligible discount resolves to
/// [`DiscountKind::None`] at its base prices. Incomplete or invalid discount
/// data disqualifies that tier silently and evaluation moves on.
pub fn resolve(product: &ProductPricing, now: DateTime<Utc>, tax: &TaxConfig) -> DiscountResolution {
    for tier in TIERS {
        if let Some(resolution) = tier(product, now, tax) {
            return resolution;
        }
    }

    DiscountResolution {
        kind: DiscountKind::None,
        unit_price_excl_tax: product.base_price_excl_tax,
        unit_price_incl_tax: product.base_price_incl_tax,
        percentage: None,
        savings_excl_tax: Money::ZERO,
    }
}

/// A percentage is usable when it is in `(0, 100]`.
fn percentage_is_valid(pct: Decimal) -> bool {
    pct > Decimal::ZERO && pct <= Decimal::new(100, 0)
}

/// Professional (contractual) rate. Wins over promotions whenever it matches:
/// a negotiated rate takes precedence over time-limited marketing.
fn professional_tier(
    product: &ProductPricing,
    _now: DateTime<Utc>,
    _tax: &TaxConfig,
) -> Option<DiscountResolution> {
    let pro = product.professional_discount.as_ref()?;
    if !pro.is_active {
        return None;
    }
    // A rate negotiated for another category is silently ignored; the
    // promotion tier still gets evaluated.
    if pro.applicable_category_id != product.category_id {
        return None;
    }
    let percentage = pro.percentage.filter(|p| percentage_is_valid(*p))?;
    let unit_excl = pro.discounted_price_excl_tax?;
    let unit_incl = pro.discounted_price_incl_tax?;
    // A "discount" above the base price is bad catalog data, not a discount.
    if unit_excl > product.base_price_excl_tax || unit_incl > product.base_price_incl_tax {
        return None;
    }

    Some(DiscountResolution {
        kind: DiscountKind::Professional,
        unit_price_excl_tax: unit_excl,
        unit_price_incl_tax: unit_incl,
        percentage: Some(percentage),
        savings_excl_tax: product.base_price_excl_tax - unit_excl,
    })
}

/// Time-limited promotion. The tax-inclusive price is the source of truth;
/// the tax-exclusive price is derived from the configured VAT multiplier.
fn promotion_tier(
    product: &ProductPricing,
    now: DateTime<Utc>,
    tax: &TaxConfig,
) -> Option<DiscountResolution> {
    let promo = product.promotion.as_ref()?;
    if !promo.is_active {
        return None;
    }
    // Strict comparison: a promotion expiring exactly now is already over.
    if promo.expires_at <= now {
        return None;
    }
    let percentage = promo.percentage.filter(|p| percentage_is_valid(*p))?;
    let unit_incl = promo.discounted_price_incl_tax?;
    let unit_excl = tax.excl_from_incl(unit_incl);
    if unit_excl > product.base_price_excl_tax || unit_incl > product.base_price_incl_tax {
        return None;
    }

    Some(DiscountResolution {
        kind: DiscountKind::Promotion,
        unit_price_excl_tax: unit_excl,
        unit_price_incl_tax: unit_incl,
        percentage: Some(percentage),
        savings_excl_tax: product.base_price_excl_tax - unit_excl,
    })
}
