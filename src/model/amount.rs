//! Amount type for the monetary value of an expense.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing the text a
//! user typed into the amount field of the entry form.

use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Represents the amount of an expense.
///
/// Amounts entered by a user are always greater than zero, see `Amount::parse`. Amounts read back
/// from the remote API are accepted as they are.
///
/// On the wire the amount is a JSON number, which the remote API reads as a double. That is why
/// `parse` refuses amounts with more than 15 significant digits.
///
/// ```
/// # use expense_entry::Amount;
/// let amount = Amount::parse(" 12.50 ").unwrap();
/// assert_eq!(amount.to_string(), "12.50");
/// assert!(Amount::parse("-5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

/// The most significant digits a double holds without rounding.
const MAX_SIGNIFICANT_DIGITS: usize = 15;

impl Amount {
    /// Parses user-entered text.
    ///
    /// # Errors
    /// - `ValidationError::EmptyAmount` if `text` is empty or only whitespace.
    /// - `ValidationError::InvalidAmount` if `text` is not a number, if it is zero or negative, or
    ///   if it has more than 15 significant digits.
    pub fn parse(text: &str) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyAmount);
        }
        // `Decimal::from_str` skips underscores, so the grammar is checked first.
        if !is_number(trimmed) {
            return Err(ValidationError::InvalidAmount(trimmed.to_string()));
        }

        // Plain decimals first, then exponent notation such as "1.5e2".
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| ValidationError::InvalidAmount(trimmed.to_string()))?;

        if value <= Decimal::ZERO || significant_digits(value) > MAX_SIGNIFICANT_DIGITS {
            return Err(ValidationError::InvalidAmount(trimmed.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

/// Matches `[+-]digits[.digits][(e|E)[+-]digits]`, where either side of the point may be empty
/// but not both.
fn is_number(text: &str) -> bool {
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(ix) => (&body[..ix], Some(&body[ix + 1..])),
        None => (body, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok = !(int.is_empty() && frac.is_empty()) && all_digits(int) && all_digits(frac);
    let exponent_ok = match exponent {
        Some(e) => {
            let e = e.strip_prefix(['+', '-']).unwrap_or(e);
            !e.is_empty() && all_digits(e)
        }
        None => true,
    };
    mantissa_ok && exponent_ok
}

fn significant_digits(value: Decimal) -> usize {
    let digits = value.normalize().mantissa().unsigned_abs().to_string();
    digits.trim_end_matches('0').len()
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::parse("12.50").unwrap();
        assert_eq!(amount.value(), Decimal::new(1250, 2));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let amount = Amount::parse("  7  ").unwrap();
        assert_eq!(amount.value(), Decimal::from(7));
    }

    #[test]
    fn test_parse_scientific() {
        let amount = Amount::parse("1.5e2").unwrap();
        assert_eq!(amount.value(), Decimal::from(150));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Amount::parse(""), Err(ValidationError::EmptyAmount));
        assert_eq!(Amount::parse("   "), Err(ValidationError::EmptyAmount));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(
            Amount::parse("abc"),
            Err(ValidationError::InvalidAmount("abc".to_string()))
        );
        assert!(Amount::parse("12,50,1").is_err());
        assert!(Amount::parse("NaN").is_err());
        assert_eq!(
            Amount::parse("1_000"),
            Err(ValidationError::InvalidAmount("1_000".to_string()))
        );
        assert!(Amount::parse("1__2.5_").is_err());
        assert!(Amount::parse(".").is_err());
        assert!(Amount::parse("1e").is_err());
        assert!(Amount::parse("e5").is_err());
    }

    #[test]
    fn test_parse_significant_digits() {
        assert!(Amount::parse("1234567890.12345").is_ok());
        assert_eq!(
            Amount::parse("1234567890.123456"),
            Err(ValidationError::InvalidAmount("1234567890.123456".to_string()))
        );
        // Trailing zeros are not significant.
        assert!(Amount::parse("100000000000000000000").is_ok());
        assert!(Amount::parse("12.500000000000000000").is_ok());
    }

    #[test]
    fn test_parse_zero_and_negative() {
        assert_eq!(
            Amount::parse("-5"),
            Err(ValidationError::InvalidAmount("-5".to_string()))
        );
        assert!(Amount::parse("0").is_err());
        assert!(Amount::parse("0.00").is_err());
    }

    #[test]
    fn test_serialize_as_number() {
        let amount = Amount::parse("12.5").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "12.5");
    }

    #[test]
    fn test_deserialize_number() {
        let amount: Amount = serde_json::from_str("42.25").unwrap();
        assert_eq!(amount.value(), Decimal::new(4225, 2));
    }
}
