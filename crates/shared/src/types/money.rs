//! Currency support for monetary values.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! All amounts are `rust_decimal::Decimal` for arbitrary precision.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Ghanaian Cedi
    Ghs,
    /// Nigerian Naira
    Ngn,
    /// Kenyan Shilling
    Kes,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ghs => write!(f, "GHS"),
            Self::Ngn => write!(f, "NGN"),
            Self::Kes => write!(f, "KES"),
            Self::Usd => write!(f, "USD"),
            Self::Eur => write!(f, "EUR"),
            Self::Gbp => write!(f, "GBP"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GHS" => Ok(Self::Ghs),
            "NGN" => Ok(Self::Ngn),
            "KES" => Ok(Self::Kes),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Ghs.to_string(), "GHS");
        assert_eq!(Currency::Ngn.to_string(), "NGN");
        assert_eq!(Currency::Kes.to_string(), "KES");
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
        assert_eq!(Currency::Gbp.to_string(), "GBP");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("GHS").unwrap(), Currency::Ghs);
        assert_eq!(Currency::from_str("ghs").unwrap(), Currency::Ghs);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_roundtrip_all_currencies() {
        for currency in [
            Currency::Ghs,
            Currency::Ngn,
            Currency::Kes,
            Currency::Usd,
            Currency::Eur,
            Currency::Gbp,
        ] {
            assert_eq!(Currency::from_str(&currency.to_string()).unwrap(), currency);
        }
    }
}
