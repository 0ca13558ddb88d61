//! # Quantity Module
//!
//! Fixed-point inventory quantities.
//!
//! Stock can be fractional (a salon buys shampoo by the litre and uses it by
//! the 250 ml). Like [`Money`](crate::money::Money), quantities never touch
//! floating point: they are stored as an `i64` count of thousandths of a unit.
//!
//! ```text
//!   "2"      →  2_000 milli-units
//!   "0.25"   →    250 milli-units
//!   "1.125"  →  1_125 milli-units
//!   "1.1255" →  rejected (more than three decimals)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

/// Number of milli-units in one whole unit.
pub const MILLI_PER_UNIT: i64 = 1_000;

/// Number of decimal places a quantity can carry.
const DECIMALS: usize = 3;

/// An inventory quantity in thousandths of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from milli-units.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * MILLI_PER_UNIT)
    }

    /// Returns the raw milli-unit count (the storage representation).
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `None` when the sum does not fit in an `i64` of milli-units.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(milli) => Some(Quantity(milli)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(milli) => Some(Quantity(milli)),
            None => None,
        }
    }

    /// Parses a decimal string such as `"2"`, `"2.5"` or `"-0.125"`.
    ///
    /// ## Example
    /// ```rust
    /// use clipper_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::parse("2.5").unwrap().milli(), 2_500);
    /// assert!(Quantity::parse("2.5001").is_err());
    /// assert!(Quantity::parse("two").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("expected a number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected a number"));
        }
        if frac.len() > DECIMALS {
            return Err(invalid("at most three decimal places"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("number too large"))?
        };
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            // "5" → 500, "25" → 250, "125" → 125
            let padded = format!("{:0<width$}", frac, width = DECIMALS);
            padded.parse().map_err(|_| invalid("expected a number"))?
        };

        let milli = whole_value
            .checked_mul(MILLI_PER_UNIT)
            .and_then(|w| w.checked_add(frac_value))
            .ok_or_else(|| invalid("number too large"))?;

        Ok(Quantity(if negative { -milli } else { milli }))
    }
}

/// Displays the shortest exact decimal: `2.5`, `3`, `-0.125`.
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / MILLI_PER_UNIT as u64;
        let frac = abs % MILLI_PER_UNIT as u64;

        if frac == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let frac = format!("{:03}", frac);
            write!(f, "{}{}.{}", sign, whole, frac.trim_end_matches('0'))
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::zero()
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}
