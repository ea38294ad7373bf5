//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                     │
//! │                                                                 │
//! │  In floating point:                                             │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                   │
//! │                                                                 │
//! │  OUR SOLUTION: Integer Cents                                    │
//! │    Every amount is an i64 count of the smallest currency unit.  │
//! │    The database, the calculations and the API all use cents.    │
//! │    The wire format is an exact decimal string ("3500.00"),      │
//! │    never a binary float.                                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//!
//! let price: Money = "1000.00".parse().unwrap();
//! assert_eq!(price.cents(), 100_000);
//! assert_eq!(price.to_string(), "1000.00");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: leaves room for refunds and corrections
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Decimal-string serde**: serialized as `"3500.00"` with exactly two
///   fractional digits, matching what is stored and what goes on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition; `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Multiplies a unit price by a quantity; `None` on overflow.
    ///
    /// This is the line-subtotal computation: exact integer arithmetic,
    /// never floating point.
    #[inline]
    pub fn checked_mul_quantity(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Calculates tax on this amount.
    ///
    /// ## Rounding
    /// Integer math with round-half-up on the cent:
    /// `(cents * bps + 5000) / 10000`. The +5000 provides the rounding
    /// (5000/10000 = 0.5). i128 intermediate prevents overflow on large
    /// amounts.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::Money;
    /// use caja_core::types::TaxRate;
    ///
    /// let net = Money::from_cents(350_000); // 3500.00
    /// let tax = net.tax(TaxRate::IVA);      // 19%
    /// assert_eq!(tax.cents(), 66_500);      // 665.00
    /// ```
    pub fn tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }
}

// =============================================================================
// Decimal String Conversion
// =============================================================================

/// Error parsing a decimal money string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseMoneyError {
    #[error("empty amount")]
    Empty,
    #[error("invalid decimal amount: {0}")]
    Invalid(String),
    #[error("amount has more than 2 fractional digits: {0}")]
    TooPrecise(String),
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses an exact decimal string such as `"3500.00"`, `"0.5"` or
    /// `"-12"`. At most two fractional digits are accepted; anything the
    /// fixed-point representation cannot hold exactly is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };

        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };

        if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseMoneyError::Invalid(s.to_string()));
        }
        if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseMoneyError::Invalid(s.to_string()));
        }
        if frac_part.len() > 2 {
            return Err(ParseMoneyError::TooPrecise(s.to_string()));
        }

        let whole: i64 = int_part
            .parse()
            .map_err(|_| ParseMoneyError::OutOfRange(s.to_string()))?;

        let frac: i64 = match frac_part.len() {
            0 => 0,
            1 => frac_part.parse::<i64>().unwrap_or(0) * 10,
            _ => frac_part.parse::<i64>().unwrap_or(0),
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .ok_or_else(|| ParseMoneyError::OutOfRange(s.to_string()))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

/// Display renders the exact decimal form with two fractional digits.
///
/// This is also the serialized wire format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// =============================================================================
// Serde: exact decimal strings, never floats
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount string such as \"3500.00\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_str(MoneyVisitor)
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_and_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!("1000.00".parse::<Money>().unwrap().cents(), 100_000);
        assert_eq!("3500".parse::<Money>().unwrap().cents(), 350_000);
        assert_eq!("0.5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("0.05".parse::<Money>().unwrap().cents(), 5);
        assert_eq!("-12.34".parse::<Money>().unwrap().cents(), -1234);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Money>(), Err(ParseMoneyError::Empty));
        assert!(matches!(
            "1.234".parse::<Money>(),
            Err(ParseMoneyError::TooPrecise(_))
        ));
        assert!(matches!(
            "12a.00".parse::<Money>(),
            Err(ParseMoneyError::Invalid(_))
        ));
        assert!(matches!(
            ".50".parse::<Money>(),
            Err(ParseMoneyError::Invalid(_))
        ));
        assert!(matches!(
            "1,000".parse::<Money>(),
            Err(ParseMoneyError::Invalid(_))
        ));
    }

    #[test]
    fn test_roundtrip_display_parse() {
        for cents in [0, 1, 99, 100, 1099, -550, 350_000] {
            let m = Money::from_cents(cents);
            assert_eq!(m.to_string().parse::<Money>().unwrap(), m);
        }
    }

    #[test]
    fn test_serde_as_string() {
        let m = Money::from_cents(350_000);
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"3500.00\"");

        let back: Money = serde_json::from_str("\"3500.00\"").unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_serde_rejects_float() {
        assert!(serde_json::from_str::<Money>("3500.0").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let mut acc = Money::zero();
        acc += a;
        acc += b;
        assert_eq!(acc.cents(), 1500);
    }

    #[test]
    fn test_checked_mul_quantity() {
        let unit = Money::from_cents(299);
        assert_eq!(unit.checked_mul_quantity(3).unwrap().cents(), 897);
        assert!(Money::from_cents(i64::MAX).checked_mul_quantity(2).is_none());
    }

    #[test]
    fn test_iva_tax() {
        // 3500.00 × 19% = 665.00 exactly
        let net = Money::from_cents(350_000);
        assert_eq!(net.tax(TaxRate::IVA).cents(), 66_500);
    }

    #[test]
    fn test_tax_rounding_half_up() {
        // 0.03 × 19% = 0.0057 → rounds to 0.01
        assert_eq!(Money::from_cents(3).tax(TaxRate::IVA).cents(), 1);
        // 0.02 × 19% = 0.0038 → rounds to 0.00
        assert_eq!(Money::from_cents(2).tax(TaxRate::IVA).cents(), 0);
        // 0.50 × 19% = 0.095 → half rounds up to 0.10
        assert_eq!(Money::from_cents(50).tax(TaxRate::IVA).cents(), 10);
    }
}
