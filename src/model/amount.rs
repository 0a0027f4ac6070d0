//! Monetary quantity type.
//!
//! `Amount` wraps `Decimal` so that money math is exact and display rounding is a
//! deliberate, final step. Parsing accepts an optional leading currency symbol and
//! thousands-separator commas so that values copied from statements paste cleanly.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A monetary quantity in some currency. The currency itself is carried separately
/// (see `Transaction::source_currency`); `Amount` is only the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

/// An error that can occur when parsing a string into an `Amount`.
pub struct AmountError(String);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AmountError({})", self.0)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError("empty amount".to_string()));
        }

        // Accept "-$50.00" and "$-50.00" alike, and strip grouping commas.
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);
        let (negative, unsigned) = match unsigned.strip_prefix('-') {
            Some(rest) => (!negative, rest),
            None => (negative, unsigned),
        };
        let cleaned = unsigned.replace(',', "");

        let magnitude = Decimal::from_str(&cleaned)
            .map_err(|e| AmountError(format!("'{s}' is not a valid amount: {e}")))?;
        let value = if negative { -magnitude } else { magnitude };
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_parse_with_symbol() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("50.00").unwrap());
    }

    #[test]
    fn test_parse_negative_symbol_first() {
        let amount = Amount::from_str("-$1,250.75").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("-1250.75").unwrap());
    }

    #[test]
    fn test_parse_negative_symbol_inside() {
        let amount = Amount::from_str("$-50").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("-50").unwrap());
    }

    #[test]
    fn test_parse_commas() {
        let amount = Amount::from_str("1,000,000").unwrap();
        assert_eq!(amount.value(), Decimal::from_str("1000000").unwrap());
    }

    #[test]
    fn test_parse_empty_is_error() {
        assert!(Amount::from_str("").is_err());
        assert!(Amount::from_str("   ").is_err());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(Amount::from_str("abc").is_err());
    }

    #[test]
    fn test_zero_is_not_negative() {
        assert!(!Amount::ZERO.is_negative());
        assert!(Amount::ZERO.is_zero());
    }

    #[test]
    fn test_serde_round_trip() {
        let amount = Amount::from_str("-60000.50").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"-60000.50\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
