//! Type-safe price representation using decimal arithmetic.
//!
//! The shop sells in Vietnamese đồng, which has no minor unit, so prices
//! are displayed rounded to whole đồng with `.` as the thousands separator
//! (e.g. `1.250.000₫`).

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in Vietnamese đồng.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of đồng.
    #[must_use]
    pub fn from_dong(amount: i64) -> Self {
        Self(Decimal::from(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .abs()
            .trunc()
            .to_string();

        let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
        for (i, ch) in rounded.chars().enumerate() {
            if i > 0 && (rounded.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{sign}{grouped}₫")
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_dong(1_250_000).to_string(), "1.250.000₫");
        assert_eq!(Price::from_dong(950).to_string(), "950₫");
        assert_eq!(Price::from_dong(0).to_string(), "0₫");
        assert_eq!(Price::from_dong(100_000).to_string(), "100.000₫");
    }

    #[test]
    fn test_display_rounds_fractional_dong() {
        let price = Price::new(Decimal::new(199_995, 1)); // 19999.5
        assert_eq!(price.to_string(), "20.000₫");
    }

    #[test]
    fn test_sum_and_multiply() {
        let total: Price = [Price::from_dong(100) * 2, Price::from_dong(50) * 1]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_dong(250));
    }

    #[test]
    fn test_deserializes_json_numbers() {
        let price: Price = serde_json::from_str("129000").unwrap();
        assert_eq!(price, Price::from_dong(129_000));
        let price: Price = serde_json::from_str("99.5").unwrap();
        assert_eq!(price, Price::new(Decimal::new(995, 1)));
    }
}
