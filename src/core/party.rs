use crate::core::error::{EngineError, EngineResult};
use crate::core::money::ensure_positive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a trading party.
///
/// Always trimmed and never empty. Ordering is lexicographic, which is
/// the order parties appear in a payment schedule.
///
/// # Examples
///
/// ```
/// use invoice_scheduler::core::party::PartyName;
///
/// let name = PartyName::new("  Acme Traders ").unwrap();
/// assert_eq!(name.as_str(), "Acme Traders");
/// assert!(PartyName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyName(String);

/// Prefix variants accepted for unregistered parties, longest first.
const UNREGISTERED_PREFIXES: [&str; 16] = [
    "UNREGISTERED - ",
    "UNREGISTERED-",
    "UNREGISTERED",
    "U.N.R-",
    "U N R-",
    "UNR - ",
    "U.N.R ",
    "U N R ",
    "UNR. ",
    "UNR_ ",
    "U.N.R",
    "U N R",
    "UNR-",
    "UNR ",
    "UNR_",
    "UNR.",
];

/// Canonical prefix written in front of unregistered party names.
pub const UNREGISTERED_PREFIX: &str = "UNR- ";

impl PartyName {
    pub fn new(name: impl AsRef<str>) -> EngineResult<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput(
                "party name must not be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rewrite the name with the canonical `UNR- ` prefix, dropping any
    /// spelling of the unregistered prefix already present.
    pub fn normalized_unregistered(&self) -> Self {
        let upper = self.0.to_uppercase();
        let rest = UNREGISTERED_PREFIXES
            .iter()
            .find(|prefix| upper.starts_with(*prefix))
            .and_then(|prefix| self.0.get(prefix.len()..))
            .map(str::trim)
            .unwrap_or(&self.0);
        Self(format!("{UNREGISTERED_PREFIX}{rest}").trim_end().to_string())
    }
}

impl fmt::Display for PartyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PartyName {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartyName> for String {
    fn from(name: PartyName) -> Self {
        name.0
    }
}

/// A party together with the balance that must be invoiced to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: PartyName,
    pub balance: Decimal,
}

impl Party {
    /// Create a party, rejecting non-positive or sub-cent balances.
    pub fn new(name: PartyName, balance: Decimal) -> EngineResult<Self> {
        ensure_positive(balance, "party balance")?;
        Ok(Self { name, balance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_party_name_trimmed() {
        let a = PartyName::new(" Acme ").unwrap();
        let b = PartyName::new("Acme").unwrap();
        assert_eq!(a, b);
        assert_eq!(format!("{}", a), "Acme");
    }

    #[test]
    fn test_party_name_empty_rejected() {
        assert!(matches!(
            PartyName::new(""),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_party_ordering() {
        assert!(PartyName::new("A-MART").unwrap() < PartyName::new("B-MART").unwrap());
    }

    #[test]
    fn test_unregistered_normalisation() {
        for raw in ["UNR-Sharma", "unr - Sharma", "U.N.R Sharma", "Unregistered-Sharma", "Sharma"] {
            let name = PartyName::new(raw).unwrap().normalized_unregistered();
            assert_eq!(name.as_str(), "UNR- Sharma", "input {raw:?}");
        }
    }

    #[test]
    fn test_party_balance_validated() {
        let name = PartyName::new("Acme").unwrap();
        assert!(Party::new(name.clone(), dec!(1500.25)).is_ok());
        assert!(Party::new(name.clone(), Decimal::ZERO).is_err());
        assert!(Party::new(name, dec!(-5)).is_err());
    }

    #[test]
    fn test_party_name_serde_rejects_blank() {
        let parsed: Result<PartyName, _> = serde_json::from_str("\"  \"");
        assert!(parsed.is_err());
        let parsed: PartyName = serde_json::from_str("\" Acme \"").unwrap();
        assert_eq!(parsed.as_str(), "Acme");
    }
}
