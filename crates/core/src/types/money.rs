//! Integer New-Taiwan-dollar amounts.
//!
//! All computation in the shop happens on whole NT$ values. Catalog rows carry
//! a decorated display string (e.g. `"NT$ 450"`); that string is parsed into a
//! [`Money`] exactly once, at the data-access boundary, and everything
//! downstream works on the integer. Carrying the display string further is a
//! formatting concern only, never a computation source.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A whole-dollar NT$ amount.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a whole-dollar value.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Parse an amount out of a currency-decorated display string.
    ///
    /// Takes the first contiguous run of ASCII digits: `"NT$ 450"` parses as
    /// 450, `"450 / 半磅"` as 450. A string with no digits parses as zero -
    /// malformed catalog data degrades silently rather than failing the cart.
    #[must_use]
    pub fn parse_display(display: &str) -> Self {
        let digits: String = display
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        Self(digits.parse().unwrap_or(0))
    }

    /// Round a fractional amount to whole dollars, half-up.
    ///
    /// The payment gateway only accepts integer amounts; midpoints round away
    /// from zero (2.5 becomes 3), matching its published requirement.
    #[must_use]
    pub fn from_decimal_rounded(amount: Decimal) -> Self {
        let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        Self(rounded.to_i64().unwrap_or(0))
    }

    /// The raw dollar value.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0 * quantity as i64)
    }

    /// Whether this amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, std::ops::Add::add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NT$ {}", self.0)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// Progress toward the free-shipping threshold.
///
/// `progress` is a whole percentage clamped to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeShippingProgress {
    /// Current cart total.
    pub current: Money,
    /// Free-shipping threshold.
    pub threshold: Money,
    /// Amount still missing; zero once the threshold is reached.
    pub remaining: Money,
    /// Percentage of the threshold reached, clamped to 100.
    pub progress: u32,
}

impl FreeShippingProgress {
    /// Compute progress of `current` toward `threshold`.
    #[must_use]
    pub fn compute(current: Money, threshold: Money) -> Self {
        let remaining = Money::new((threshold.amount() - current.amount()).max(0));
        let progress = if threshold.amount() <= 0 {
            100
        } else {
            u32::try_from((current.amount() * 100 / threshold.amount()).clamp(0, 100))
                .unwrap_or(100)
        };
        Self {
            current,
            threshold,
            remaining,
            progress,
        }
    }

    /// Whether the order ships free.
    #[must_use]
    pub const fn qualifies(&self) -> bool {
        self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn parse_display_extracts_digits() {
        assert_eq!(Money::parse_display("NT$ 450"), Money::new(450));
        assert_eq!(Money::parse_display("NT$450"), Money::new(450));
        assert_eq!(Money::parse_display("450"), Money::new(450));
    }

    #[test]
    fn parse_display_without_digits_is_zero() {
        assert_eq!(Money::parse_display(""), Money::ZERO);
        assert_eq!(Money::parse_display("免費"), Money::ZERO);
    }

    #[test]
    fn parse_display_takes_first_run() {
        // Only the first contiguous run counts; the suffix is decoration.
        assert_eq!(Money::parse_display("NT$ 380 / 半磅"), Money::new(380));
    }

    #[test]
    fn times_and_sum() {
        let total: Money = [Money::new(450).times(2), Money::new(380).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(1280));
    }

    #[test]
    fn decimal_rounding_is_half_up() {
        assert_eq!(
            Money::from_decimal_rounded(Decimal::new(25, 1)), // 2.5
            Money::new(3)
        );
        assert_eq!(
            Money::from_decimal_rounded(Decimal::new(24, 1)), // 2.4
            Money::new(2)
        );
        assert_eq!(Money::from_decimal_rounded(Decimal::new(560, 0)), Money::new(560));
    }

    #[test]
    fn display_renders_decorated() {
        assert_eq!(Money::new(1280).to_string(), "NT$ 1280");
    }

    #[test]
    fn progress_at_threshold() {
        let p = FreeShippingProgress::compute(Money::new(3000), Money::new(3000));
        assert_eq!(p.remaining, Money::ZERO);
        assert_eq!(p.progress, 100);
        assert!(p.qualifies());
    }

    #[test]
    fn progress_above_threshold_clamps() {
        let p = FreeShippingProgress::compute(Money::new(4500), Money::new(3000));
        assert_eq!(p.remaining, Money::ZERO);
        assert_eq!(p.progress, 100);
    }

    #[test]
    fn progress_halfway() {
        let p = FreeShippingProgress::compute(Money::new(1500), Money::new(3000));
        assert_eq!(p.remaining, Money::new(1500));
        assert_eq!(p.progress, 50);
        assert!(!p.qualifies());
    }
}
