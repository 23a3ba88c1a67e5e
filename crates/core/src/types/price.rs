//! Type-safe price representation using decimal arithmetic.

use std::fmt;
use std::iter::Sum;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., shillings, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[serde(default)]
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply the amount by a line quantity.
    ///
    /// Saturates at the largest representable amount instead of overflowing.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        let amount = self
            .amount
            .checked_mul(Decimal::from(quantity))
            .unwrap_or_else(|| saturated(self.amount));
        Self::new(amount, self.currency_code)
    }

    /// Add another amount, saturating like [`Price::times`].
    #[must_use]
    pub fn saturating_add(&self, other: &Self) -> Self {
        let amount = self
            .amount
            .checked_add(other.amount)
            .unwrap_or_else(|| saturated(self.amount));
        Self::new(amount, self.currency_code)
    }
}

/// The bound an overflowing operation clamps to, by sign of its input.
fn saturated(amount: Decimal) -> Decimal {
    if amount.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency_code.code(), self.amount)
    }
}

/// Sums amounts, keeping the currency of the first price.
///
/// An empty iterator yields zero in the default currency. Overflow saturates.
impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(mut iter: I) -> Self {
        let Some(first) = iter.next() else {
            return Self::zero(CurrencyCode::default());
        };
        iter.fold(first, |acc, price| acc.saturating_add(&price))
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    KES,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// The three-letter code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::KES => "KES",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_two_decimals() {
        let price = Price::new(Decimal::new(2000, 0), CurrencyCode::KES);
        assert_eq!(price.to_string(), "KES 2000.00");
    }

    #[test]
    fn test_times_quantity() {
        let price = Price::new(Decimal::new(5999, 2), CurrencyCode::KES);
        assert_eq!(price.times(3).amount, Decimal::new(17997, 2));
    }

    #[test]
    fn test_sum_empty_is_zero_kes() {
        let total: Price = std::iter::empty().sum();
        assert_eq!(total, Price::zero(CurrencyCode::KES));
    }

    #[test]
    fn test_sum_keeps_first_currency() {
        let total: Price = [
            Price::new(Decimal::new(10, 0), CurrencyCode::USD),
            Price::new(Decimal::new(5, 0), CurrencyCode::USD),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Price::new(Decimal::new(15, 0), CurrencyCode::USD));
    }

    #[test]
    fn test_times_saturates_on_overflow() {
        let price = Price::new(
            Decimal::from_i128_with_scale(10_i128.pow(20), 0),
            CurrencyCode::KES,
        );
        let line = price.times(u32::MAX);
        assert_eq!(line.amount, Decimal::MAX);
        assert_eq!(line.currency_code, CurrencyCode::KES);

        let refund = Price::new(-Decimal::MAX, CurrencyCode::KES);
        assert_eq!(refund.times(2).amount, Decimal::MIN);
    }

    #[test]
    fn test_sum_saturates_on_overflow() {
        let total: Price = [
            Price::new(Decimal::MAX, CurrencyCode::KES),
            Price::new(Decimal::ONE, CurrencyCode::KES),
            Price::new(Decimal::new(5, 0), CurrencyCode::KES),
        ]
        .into_iter()
        .sum();
        assert_eq!(total.amount, Decimal::MAX);
        assert_eq!(total.to_string(), format!("KES {:.2}", Decimal::MAX));
    }
}
