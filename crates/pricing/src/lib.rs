//! `vitrine-pricing` — discount resolution and basket totals.
//!
//! Pure domain logic: given a product's pricing snapshot, pick at most one
//! discount (professional rate or promotion, in that priority order) and
//! derive the unit price to charge. No I/O, no clocks — callers pass `now`.

pub mod product;
pub mod resolver;
pub mod totals;

pub use product::{ProductPricing, ProfessionalDiscount, Promotion};
pub use resolver::{resolve, DiscountKind, DiscountResolution};
pub use totals::{average_unit_price_incl_tax, BasketTotals, PricedLine};
