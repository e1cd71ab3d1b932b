//! Money amounts.
//!
//! Prices are exact decimal amounts in a single implicit currency (the
//! storefront is single-market). `rust_decimal` keeps tax division exact:
//! `120.00 / 1.20` must come back as `100.00`, not a float approximation.

use core::ops::{Add, AddAssign, Mul, Sub};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exact decimal money amount.
///
/// Compared by value; arithmetic delegates to `rust_decimal`. Negative
/// amounts are representable (savings deltas are clamped by callers where
/// the domain requires non-negativity).
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Build from an integer number of cents (two decimal places).
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Divide by a decimal factor, returning zero when the divisor is zero
    /// rather than panicking.
    pub fn checked_div(&self, divisor: Decimal) -> Money {
        if divisor.is_zero() {
            return Money::ZERO;
        }
        Money(self.0 / divisor)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Money {
        Money(self.0 * rhs)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_has_two_decimal_places() {
        assert_eq!(Money::from_cents(10800).amount(), Decimal::new(10800, 2));
    }

    #[test]
    fn checked_div_by_zero_returns_zero() {
        let m = Money::from_cents(10000);
        assert_eq!(m.checked_div(Decimal::ZERO), Money::ZERO);
    }

    #[test]
    fn tax_division_is_exact() {
        let incl = Money::from_cents(12000);
        let excl = incl.checked_div(Decimal::new(120, 2));
        assert_eq!(excl.amount(), Decimal::new(100, 0));
    }

    #[test]
    fn arithmetic_round_trips() {
        let a = Money::from_cents(9000);
        let b = Money::from_cents(1000);
        assert_eq!(a + b, Money::from_cents(10000));
        assert_eq!(a - b, Money::from_cents(8000));
    }
}
