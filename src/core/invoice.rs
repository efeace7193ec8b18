use crate::core::money::round_money;
use crate::core::party::PartyName;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of document being generated.
///
/// `Sales` invoices carry a margin on top of the purchase rate;
/// `Purchase` invoices are billed at the bare rate (margin forced to zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Sales,
    Purchase,
}

impl DocumentKind {
    pub fn bears_margin(self) -> bool {
        matches!(self, Self::Sales)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sales => write!(f, "sales"),
            Self::Purchase => write!(f, "purchase"),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" | "sale" => Ok(Self::Sales),
            "purchase" | "purchases" => Ok(Self::Purchase),
            other => Err(format!("unknown document kind '{other}'")),
        }
    }
}

/// A single generated invoice line.
///
/// `margin` is a percentage: 2.25 means the amount carries a 2.25% markup.
/// For every row produced by the emitter,
/// `amount == round(quantity * rate * (1 + margin / 100), 2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub number: u64,
    pub date: NaiveDate,
    pub party: PartyName,
    pub product: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub margin: Decimal,
    pub amount: Decimal,
    /// Party balance still to be invoiced after this row.
    pub remaining_balance: Decimal,
}

impl InvoiceRow {
    /// Display label in the `MON-NNN` style, e.g. `JAN-007`.
    pub fn label(&self) -> String {
        format!(
            "{}-{:03}",
            self.date.format("%b").to_string().to_uppercase(),
            self.number
        )
    }

    /// Rate after applying the margin, unrounded.
    pub fn effective_rate(&self) -> Decimal {
        effective_rate(self.rate, self.margin)
    }

    /// Rate after applying the margin, rounded to cents.
    pub fn sale_rate(&self) -> Decimal {
        round_money(self.effective_rate())
    }

    /// Amount implied by quantity, rate and margin.
    pub fn expected_amount(&self) -> Decimal {
        round_money(self.quantity * self.effective_rate())
    }
}

/// `rate * (1 + margin_percent / 100)`.
pub fn effective_rate(rate: Decimal, margin_percent: Decimal) -> Decimal {
    rate * (Decimal::ONE + margin_percent / Decimal::ONE_HUNDRED)
}
