//! `vitrine-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no network or storage
//! concerns): typed identifiers, money amounts, tax configuration, and the
//! domain error model shared by the pricing and session layers.

pub mod error;
pub mod id;
pub mod money;
pub mod tax;

pub use error::DomainError;
pub use id::{CategoryId, ProductId};
pub use money::Money;
pub use tax::TaxConfig;
