//! Money amounts.
//!
//! Prices are whole currency units (roubles) backed by [`Decimal`] so that
//! sums never pick up floating point error. There is no fractional rounding:
//! `unit price × quantity` is exact.
//!
//! The operators saturate instead of panicking; code that must notice an
//! overflow uses [`Price::checked_times`] and [`Price::checked_add`].
//! Amounts persisted by the shop fit `NUMERIC(12, 2)`, see [`Price::is_storable`].

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price or total in the shop currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(transparent))]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Most decimal places a stored amount may have.
    pub const MAX_SCALE: u32 = 2;

    /// Largest amount a `NUMERIC(12, 2)` column holds.
    #[must_use]
    pub fn max_storable() -> Self {
        Self(Decimal::new(999_999_999_999, Self::MAX_SCALE))
    }

    /// Wrap a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// A price of `units` whole currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// `true` for amounts below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Total for `quantity` units at this price, saturating on overflow.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Total for `quantity` units, `None` on overflow.
    #[must_use]
    pub fn checked_times(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// Sum of two amounts, `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Whether the amount is stored without rounding or overflow: at most
    /// two decimal places and within `±max_storable()`.
    #[must_use]
    pub fn is_storable(&self) -> bool {
        self.0.normalize().scale() <= Self::MAX_SCALE && self.0.abs() <= Self::max_storable().0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ₽", self.0.normalize())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let total: Price = [Price::from_units(100) * 2, Price::from_units(35) * 3]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_units(305));
    }

    #[test]
    fn test_overflow_is_reported_not_panicked() {
        let huge = Price::new(Decimal::MAX);
        assert_eq!(huge.checked_times(2), None);
        assert_eq!(huge.checked_add(Price::from_units(1)), None);
        assert_eq!(huge.times(2), huge);
        assert_eq!(huge + Price::from_units(1), huge);
        assert_eq!(
            Price::from_units(100).checked_times(3),
            Some(Price::from_units(300))
        );
    }

    #[test]
    fn test_storable_range_and_scale() {
        assert!(Price::from_units(1500).is_storable());
        assert!(Price::new(Decimal::new(125_050, 2)).is_storable());
        assert!(Price::new(Decimal::new(1_500, 3)).is_storable());
        assert!(Price::max_storable().is_storable());

        assert!(!Price::new(Decimal::new(5, 3)).is_storable());
        assert!(!Price::from_units(10_000_000_000).is_storable());
        assert!(!Price::new(Decimal::MAX).is_storable());
    }

    #[test]
    fn test_negative() {
        assert!(Price::from_units(-1).is_negative());
        assert!(!Price::ZERO.is_negative());
        assert!(!Price::from_units(10).is_negative());
    }

    #[test]
    fn test_display_in_whole_units() {
        assert_eq!(Price::from_units(1500).to_string(), "1500 ₽");
    }

    #[test]
    fn test_serde_accepts_numbers_and_strings() {
        let from_number: Price = serde_json::from_str("250").unwrap();
        let from_string: Price = serde_json::from_str("\"250\"").unwrap();
        assert_eq!(from_number, Price::from_units(250));
        assert_eq!(from_string, Price::from_units(250));
    }
}
