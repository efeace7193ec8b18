use crate::core::error::{EngineError, EngineResult};
use crate::core::money::ensure_positive;
use crate::core::party::PartyName;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An invoice-level amount owed to a party, fed into the payment scheduler.
///
/// Bills are immutable once read; the scheduler only ever borrows them.
///
/// # Examples
///
/// ```
/// use invoice_scheduler::core::bill::Bill;
/// use invoice_scheduler::core::party::PartyName;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let bill = Bill::new(
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     "B1",
///     PartyName::new("Party A").unwrap(),
///     dec!(25000),
/// )
/// .unwrap();
///
/// assert_eq!(bill.amount(), dec!(25000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    date: NaiveDate,
    bill_id: String,
    party: PartyName,
    amount: Decimal,
}

impl Bill {
    /// Create a bill. Fails with `InvalidAmount` unless `amount` is a
    /// positive, cent-precise value, and with `InvalidInput` for a blank id.
    pub fn new(
        date: NaiveDate,
        bill_id: impl Into<String>,
        party: PartyName,
        amount: Decimal,
    ) -> EngineResult<Self> {
        ensure_positive(amount, "bill amount")?;
        let bill_id = bill_id.into().trim().to_string();
        if bill_id.is_empty() {
            return Err(EngineError::InvalidInput("bill id must not be empty".into()));
        }
        Ok(Self {
            date,
            bill_id,
            party,
            amount,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn bill_id(&self) -> &str {
        &self.bill_id
    }

    pub fn party(&self) -> &PartyName {
        &self.party
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// One placement of (part of) a bill on a payment day.
///
/// Same shape as [`Bill`]; `date` is the payment date rather than the
/// bill date, and `amount` is the portion paid on that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub date: NaiveDate,
    pub bill_id: String,
    pub party: PartyName,
    pub amount: Decimal,
}

impl PaymentRow {
    /// Re-read a scheduled payment as a bill, e.g. to reschedule a schedule.
    pub fn to_bill(&self) -> EngineResult<Bill> {
        Bill::new(self.date, self.bill_id.clone(), self.party.clone(), self.amount)
    }
}
