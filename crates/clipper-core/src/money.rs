//! # Money
//!
//! Prices, totals and commissions as whole cents.
//!
//! ```text
//!   float:  35.10 + 12.20 + 0.10 ... (a day of tickets)  → 1473.9999999
//!   cents:  3510  + 1220  + 10   ...                      → 147400
//! ```
//! A day of tickets summed as floats drifts by fractions of a cent and the
//! commission report stops matching the till. Every amount in the shop is
//! an `i64` count of cents instead.
//!
//! ## Usage
//! ```rust
//! use clipper_core::money::Money;
//! use clipper_core::quantity::Quantity;
//!
//! let haircut = Money::from_cents(3500); // $35.00
//! let total = haircut + Money::from_cents(1200);
//! assert_eq!(total.cents(), 4700);
//!
//! // Half a bottle of tonic at $9.99 a bottle
//! let line = Money::from_cents(999).times_quantity(Quantity::from_milli(500));
//! assert_eq!(line, Some(Money::from_cents(500)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::{Quantity, MILLI_PER_UNIT};

// =============================================================================
// Money Type
// =============================================================================

/// An amount in cents. Signed, so differences and corrections fit.
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Service.price_cents ──► TransactionItem.price_cents ──► line_total    │
/// │                                                              │         │
/// │  Service.commission_cents ──► TransactionItem.commission ────┤         │
/// │                                                              ▼         │
/// │  Transaction.total_cents ──► RevenueReport (per barber / method)       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole-currency part, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Cents past the whole-currency part, 0..=99 regardless of sign.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a (possibly fractional) quantity.
    ///
    /// ## Rounding
    /// The exact product is in thousandths of a cent; it is rounded half away
    /// from zero to the nearest cent. The intermediate product is an i128.
    ///
    /// ## Returns
    /// `None` when the rounded result does not fit in an `i64` of cents.
    ///
    /// ## Example
    /// ```rust
    /// use clipper_core::money::Money;
    /// use clipper_core::quantity::Quantity;
    ///
    /// let unit = Money::from_cents(1000); // $10.00
    /// assert_eq!(unit.times_quantity(Quantity::from_milli(2_500)), Some(Money::from_cents(2500)));
    /// assert_eq!(unit.times_quantity(Quantity::from_units(3)), Some(Money::from_cents(3000)));
    /// assert_eq!(Money::from_cents(i64::MAX).times_quantity(Quantity::from_units(2)), None);
    /// ```
    pub fn times_quantity(&self, qty: Quantity) -> Option<Money> {
        let product = self.0 as i128 * qty.milli() as i128;
        let scale = MILLI_PER_UNIT as i128;
        let half = scale / 2;
        let rounded = if product >= 0 {
            (product + half) / scale
        } else {
            (product - half) / scale
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// [`times_quantity`](Self::times_quantity) clamped to the `i64` range,
    /// for rows whose totals were already bounded when they were written.
    pub fn saturating_times_quantity(&self, qty: Quantity) -> Money {
        self.times_quantity(qty).unwrap_or_else(|| {
            if self.is_negative() != qty.is_negative() {
                Money(i64::MIN)
            } else {
                Money(i64::MAX)
            }
        })
    }

    /// `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Integer division used for averages (truncates toward zero).
    ///
    /// Returns zero when `count` is zero.
    pub fn average_over(&self, count: i64) -> Money {
        if count == 0 {
            return Money::zero();
        }
        Money(self.0 / count)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `$35.00` / `-$4.50`, for logs and CLI output. Screens localize.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        write!(f, "${}.{:02}", self.dollars().abs(), self.cents_part())
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a whole count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let fade = Money::from_cents(4050);
        assert_eq!((fade.dollars(), fade.cents_part()), (40, 50));

        let correction = Money::from_cents(-1205);
        assert_eq!((correction.dollars(), correction.cents_part()), (-12, 5));
        assert!(correction.is_negative());
        assert!(Money::default().is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(3500).to_string(), "$35.00");
        assert_eq!(Money::from_cents(7).to_string(), "$0.07");
        assert_eq!(Money::from_cents(-450).to_string(), "-$4.50");
        assert_eq!(Money::from_cents(-45).to_string(), "-$0.45");
    }

    #[test]
    fn test_ticket_arithmetic() {
        let haircut = Money::from_cents(3500);
        let beard = Money::from_cents(2000);

        assert_eq!((haircut + beard).cents(), 5500);
        assert_eq!((haircut - beard).cents(), 1500);
        assert_eq!((beard * 2).cents(), 4000);

        let mut ticket = haircut;
        ticket += beard;
        ticket -= Money::from_cents(500);
        assert_eq!(ticket, Money::from_cents(5000));
    }

    #[test]
    fn test_times_quantity_whole_units() {
        let unit = Money::from_cents(299);
        assert_eq!(unit.times_quantity(Quantity::from_units(3)).unwrap().cents(), 897);
    }

    #[test]
    fn test_times_quantity_rounds_half_away_from_zero() {
        // 333 cents × 0.5 = 166.5 cents → 167
        let unit = Money::from_cents(333);
        assert_eq!(unit.times_quantity(Quantity::from_milli(500)).unwrap().cents(), 167);

        // -333 cents × 0.5 = -166.5 cents → -167
        let refund = Money::from_cents(-333);
        assert_eq!(refund.times_quantity(Quantity::from_milli(500)).unwrap().cents(), -167);

        // 100 cents × 0.001 = 0.1 cent → 0
        assert_eq!(
            Money::from_cents(100).times_quantity(Quantity::from_milli(1)).unwrap().cents(),
            0
        );
    }

    #[test]
    fn test_times_quantity_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(huge.times_quantity(Quantity::from_units(4)), None);
        assert_eq!(huge.saturating_times_quantity(Quantity::from_units(4)).cents(), i64::MAX);
        assert_eq!(
            Money::from_cents(-(i64::MAX / 2)).saturating_times_quantity(Quantity::from_units(4)).cents(),
            i64::MIN
        );
        assert_eq!(huge.checked_add(huge), Some(Money::from_cents(i64::MAX - 1)));
        assert_eq!(huge.checked_add(huge + Money::from_cents(2)), None);
        assert_eq!(Money::from_cents(i64::MAX).saturating_add(Money::from_cents(1)).cents(), i64::MAX);
    }

    #[test]
    fn test_sum_and_average() {
        let total: Money = [1000, 2500, 500]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 4000);
        assert_eq!(total.average_over(3).cents(), 1333);
        assert_eq!(total.average_over(0), Money::zero());
    }
}
