use crate::core::error::{EngineError, EngineResult};
use crate::core::party::PartyName;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Scheduling state for one party: a day cursor plus the amount already
/// committed on each day the cursor has visited.
///
/// The cursor only ever moves forward, so a later bill can never claim
/// capacity on a day before one an earlier bill has already reached.
/// Owned by a single scheduling pass and dropped with it.
#[derive(Debug, Clone)]
pub struct PartyLedger {
    party: PartyName,
    cap: Decimal,
    cursor: Option<NaiveDate>,
    /// day -> amount committed on that day
    committed: BTreeMap<NaiveDate, Decimal>,
}

impl PartyLedger {
    pub fn new(party: PartyName, cap: Decimal) -> Self {
        Self {
            party,
            cap,
            cursor: None,
            committed: BTreeMap::new(),
        }
    }

    pub fn party(&self) -> &PartyName {
        &self.party
    }

    pub fn cursor(&self) -> Option<NaiveDate> {
        self.cursor
    }

    /// Move the cursor to `date` unless it is already past it.
    pub fn seek(&mut self, date: NaiveDate) -> NaiveDate {
        let day = self.cursor.map_or(date, |current| current.max(date));
        self.cursor = Some(day);
        day
    }

    /// Amount already committed on `date`.
    pub fn committed_on(&self, date: NaiveDate) -> Decimal {
        self.committed.get(&date).copied().unwrap_or(Decimal::ZERO)
    }

    /// Capacity left on the cursor day.
    pub fn remaining_capacity(&self) -> Decimal {
        self.cursor
            .map_or(Decimal::ZERO, |day| (self.cap - self.committed_on(day)).max(Decimal::ZERO))
    }

    /// Commit as much of `amount` as fits on the cursor day.
    ///
    /// Returns the cursor day and the amount placed (zero when the day is
    /// exhausted). The cursor itself does not move.
    pub fn commit(&mut self, amount: Decimal) -> EngineResult<(NaiveDate, Decimal)> {
        let day = self.cursor.ok_or_else(|| {
            EngineError::ProcessingFailure(format!("no cursor day for party {}", self.party))
        })?;
        let placed = amount.min(self.remaining_capacity());
        if placed > Decimal::ZERO {
            *self.committed.entry(day).or_insert(Decimal::ZERO) += placed;
        }
        Ok((day, placed))
    }

    /// Step the cursor to the next calendar day.
    pub fn advance(&mut self) -> EngineResult<NaiveDate> {
        let next = self
            .cursor
            .and_then(|day| day.checked_add_days(Days::new(1)))
            .ok_or_else(|| {
                EngineError::ProcessingFailure(format!(
                    "payment calendar exhausted for party {}",
                    self.party
                ))
            })?;
        self.cursor = Some(next);
        Ok(next)
    }

    /// Total committed across every day.
    pub fn total_committed(&self) -> Decimal {
        self.committed.values().sum()
    }

    /// True when no day holds more than the cap.
    pub fn within_cap(&self) -> bool {
        self.committed.values().all(|amount| *amount <= self.cap)
    }
}
