use crate::core::error::{EngineError, EngineResult};
use crate::core::invoice::DocumentKind;
use crate::core::money::is_whole_cents;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed interval `[min, max]` of decimal values with cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl AmountRange {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check ordering, sign and precision.
    ///
    /// `allow_zero` admits a lower bound of exactly zero (margins);
    /// otherwise both bounds must be strictly positive (rates, sizes).
    pub fn validate(&self, what: &str, allow_zero: bool) -> EngineResult<()> {
        if self.min > self.max {
            return Err(EngineError::InvalidBounds(format!(
                "{what} minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        let floor_ok = if allow_zero {
            self.min >= Decimal::ZERO
        } else {
            self.min > Decimal::ZERO
        };
        if !floor_ok {
            let expected = if allow_zero { "non-negative" } else { "positive" };
            return Err(EngineError::InvalidBounds(format!(
                "{what} bounds must be {expected}, got {self}"
            )));
        }
        if !is_whole_cents(self.min) || !is_whole_cents(self.max) {
            return Err(EngineError::InvalidBounds(format!(
                "{what} bounds allow at most two decimal places, got {self}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for AmountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Tunables for a generation job.
///
/// Defaults match the invoice desk's standing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Purchase rate per unit.
    pub rate_range: AmountRange,
    /// Margin percentage applied to sales documents.
    pub margin_range: AmountRange,
    /// Value of a single invoice row before the party's final remainder row.
    pub invoice_value: AmountRange,
    /// Largest gap in days between consecutive invoices of one party.
    pub max_day_gap: u32,
    pub document_kind: DocumentKind,
    /// Prefix for synthesized party names (`PARTY-001`, `PARTY-002`, ...).
    pub party_prefix: String,
    /// Up to this many percent more parties than the minimum feasible count.
    pub extra_party_percent: u32,
    /// How far (in percent) an allocated balance may stray from the even share.
    pub balance_spread_percent: u32,
    /// Rewrite party names with the canonical unregistered prefix.
    pub normalize_unregistered: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rate_range: AmountRange::new(dec!(22.00), dec!(23.00)),
            margin_range: AmountRange::new(dec!(2.25), dec!(2.65)),
            invoice_value: AmountRange::new(dec!(20000), dec!(48000)),
            max_day_gap: 10,
            document_kind: DocumentKind::Sales,
            party_prefix: "PARTY".to_string(),
            extra_party_percent: 20,
            balance_spread_percent: 25,
            normalize_unregistered: false,
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.rate_range.validate("rate", false)?;
        self.margin_range.validate("margin", true)?;
        self.invoice_value.validate("invoice value", false)?;
        if self.party_prefix.trim().is_empty() {
            return Err(EngineError::InvalidInput(
                "party prefix must not be empty".into(),
            ));
        }
        Ok(())
    }
}
