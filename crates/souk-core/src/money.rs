//! Minor-unit money.
//!
//! Amounts are signed integers in the currency's smallest unit (cents for
//! USD). Balances are sums of these integers; floating point never enters
//! the picture.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A validated ISO 4217 currency code: exactly three ASCII uppercase letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Create a validated currency code.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCurrency`] unless the input is
    /// exactly three ASCII uppercase letters.
    pub fn new(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        let valid = code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase());
        if !valid {
            return Err(ValidationError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    /// The currency code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A monetary amount in minor units with its currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Signed amount in the currency's smallest unit.
    pub amount_minor: i64,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

impl Money {
    /// Create a monetary amount.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a monetary amount, validating the currency code.
    pub fn from_parts(
        amount_minor: i64,
        currency: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            amount_minor,
            currency: Currency::new(currency)?,
        })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount_minor, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_accepts_iso_codes() {
        assert!(Currency::new("USD").is_ok());
        assert!(Currency::new("PKR").is_ok());
        assert!(Currency::new("EUR").is_ok());
    }

    #[test]
    fn currency_rejects_invalid() {
        assert!(Currency::new("").is_err());
        assert!(Currency::new("usd").is_err());
        assert!(Currency::new("USDT").is_err());
        assert!(Currency::new("U$D").is_err());
        assert!(Currency::new("US").is_err());
    }

    #[test]
    fn money_display() {
        let money = Money::from_parts(2500, "USD").unwrap();
        assert_eq!(money.to_string(), "2500 USD");
    }

    #[test]
    fn money_negative_amounts_allowed() {
        // Debits are negative entries; the type does not forbid them.
        let money = Money::from_parts(-100, "EUR").unwrap();
        assert_eq!(money.amount_minor, -100);
    }

    #[test]
    fn money_serialization_roundtrip() {
        let money = Money::from_parts(999, "GBP").unwrap();
        let json = serde_json::to_string(&money).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
        assert!(json.contains("\"GBP\""));
    }
}
