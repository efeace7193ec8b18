use crate::core::bill::{Bill, PaymentRow};
use crate::core::error::{EngineError, EngineResult};
use crate::core::money::is_whole_cents;
use crate::core::party::PartyName;
use crate::scheduling::ledger::PartyLedger;
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Regulatory limit on cash paid to one party in one day.
pub const DEFAULT_DAILY_CAP: Decimal = dec!(20000);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub daily_cap: Decimal,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_cap: DEFAULT_DAILY_CAP,
        }
    }
}

/// A payment placed by the scheduler, tagged with the input position of
/// its bill so the merged output can be ordered deterministically.
#[derive(Debug, Clone)]
struct Placement {
    sequence: usize,
    row: PaymentRow,
}

/// Splits bills into day-by-day payments so that no party is paid more
/// than the daily cap on any single day.
///
/// Each party is scheduled independently and greedily: bills oldest first
/// (ties by input order), each filling the party's cursor day before
/// spilling onto following days.
#[derive(Debug, Clone)]
pub struct DailyCapScheduler {
    cap: Decimal,
}

impl Default for DailyCapScheduler {
    fn default() -> Self {
        Self {
            cap: DEFAULT_DAILY_CAP,
        }
    }
}

impl DailyCapScheduler {
    /// Fails with `InvalidCap` unless `cap` is positive and cent-precise.
    pub fn new(cap: Decimal) -> EngineResult<Self> {
        if cap <= Decimal::ZERO || !is_whole_cents(cap) {
            return Err(EngineError::InvalidCap(cap));
        }
        Ok(Self { cap })
    }

    pub fn from_config(config: &ScheduleConfig) -> EngineResult<Self> {
        Self::new(config.daily_cap)
    }

    pub fn cap(&self) -> Decimal {
        self.cap
    }

    /// Produce the payment schedule, ordered by party, then payment date,
    /// then input position of the bill.
    pub fn schedule(&self, bills: &[Bill]) -> EngineResult<Vec<PaymentRow>> {
        for bill in bills {
            if bill.amount() <= Decimal::ZERO || !is_whole_cents(bill.amount()) {
                return Err(EngineError::invalid_amount(
                    bill.amount(),
                    format!("bill {} must be a positive, cent-precise amount", bill.bill_id()),
                ));
            }
        }

        let mut by_party: BTreeMap<&PartyName, Vec<(usize, &Bill)>> = BTreeMap::new();
        for (sequence, bill) in bills.iter().enumerate() {
            by_party.entry(bill.party()).or_default().push((sequence, bill));
        }

        let mut placements = Vec::with_capacity(bills.len());
        for (party, party_bills) in by_party {
            placements.extend(self.schedule_party(party, party_bills)?);
        }

        placements.sort_by(|a, b| {
            (&a.row.party, a.row.date, a.sequence).cmp(&(&b.row.party, b.row.date, b.sequence))
        });

        info!(
            "scheduled {} bills into {} payments (cap {})",
            bills.len(),
            placements.len(),
            self.cap
        );
        Ok(placements.into_iter().map(|p| p.row).collect())
    }

    fn schedule_party(
        &self,
        party: &PartyName,
        mut bills: Vec<(usize, &Bill)>,
    ) -> EngineResult<Vec<Placement>> {
        bills.sort_by_key(|(sequence, bill)| (bill.date(), *sequence));

        let mut ledger = PartyLedger::new(party.clone(), self.cap);
        let mut placements = Vec::new();

        for (sequence, bill) in bills {
            ledger.seek(bill.date());
            let mut remaining = bill.amount();
            loop {
                let (day, placed) = ledger.commit(remaining)?;
                if placed > Decimal::ZERO {
                    remaining -= placed;
                    placements.push(Placement {
                        sequence,
                        row: payment(bill, day, placed),
                    });
                }
                if remaining == Decimal::ZERO {
                    break;
                }
                ledger.advance()?;
            }
        }

        debug!(
            "party {}: {} payments, {} committed, cursor at {:?}",
            party,
            placements.len(),
            ledger.total_committed(),
            ledger.cursor()
        );
        Ok(placements)
    }
}

fn payment(bill: &Bill, date: NaiveDate, amount: Decimal) -> PaymentRow {
    PaymentRow {
        date,
        bill_id: bill.bill_id().to_string(),
        party: bill.party().clone(),
        amount,
    }
}

/// Schedule `bills` under `cap` with a one-off scheduler.
pub fn schedule(bills: &[Bill], cap: Decimal) -> EngineResult<Vec<PaymentRow>> {
    DailyCapScheduler::new(cap)?.schedule(bills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn bill(d: u32, id: &str, party: &str, amount: Decimal) -> Bill {
        Bill::new(day(d), id, PartyName::new(party).unwrap(), amount).unwrap()
    }

    fn row(d: u32, id: &str, party: &str, amount: Decimal) -> PaymentRow {
        PaymentRow {
            date: day(d),
            bill_id: id.into(),
            party: PartyName::new(party).unwrap(),
            amount,
        }
    }

    #[test]
    fn test_shared_cursor_scenario() {
        let bills = vec![
            bill(1, "B1", "PartyA", dec!(25000)),
            bill(1, "B2", "PartyA", dec!(10000)),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        assert_eq!(
            rows,
            vec![
                row(1, "B1", "PartyA", dec!(20000)),
                row(2, "B1", "PartyA", dec!(5000)),
                row(2, "B2", "PartyA", dec!(10000)),
            ]
        );
    }

    #[test]
    fn test_exact_fit_keeps_cursor_then_next_bill_advances() {
        let bills = vec![
            bill(1, "B1", "A", dec!(20000)),
            bill(1, "B2", "A", dec!(500)),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        assert_eq!(
            rows,
            vec![row(1, "B1", "A", dec!(20000)), row(2, "B2", "A", dec!(500))]
        );
    }

    #[test]
    fn test_leftover_capacity_shared_by_next_bill() {
        let bills = vec![
            bill(1, "B1", "A", dec!(12000)),
            bill(1, "B2", "A", dec!(8000)),
            bill(1, "B3", "A", dec!(1)),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        assert_eq!(
            rows,
            vec![
                row(1, "B1", "A", dec!(12000)),
                row(1, "B2", "A", dec!(8000)),
                row(2, "B3", "A", dec!(1)),
            ]
        );
    }

    #[test]
    fn test_large_bill_spans_many_days() {
        let rows = schedule(&[bill(1, "B1", "A", dec!(65000.50))], dec!(20000)).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3], row(4, "B1", "A", dec!(5000.50)));
        let sum: Decimal = rows.iter().map(|r| r.amount).sum();
        assert_eq!(sum, dec!(65000.50));
    }

    #[test]
    fn test_later_bill_date_moves_cursor_forward() {
        let bills = vec![
            bill(1, "B1", "A", dec!(5000)),
            bill(10, "B2", "A", dec!(5000)),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        assert_eq!(rows[1], row(10, "B2", "A", dec!(5000)));
    }

    #[test]
    fn test_bills_sorted_by_date_within_party() {
        let bills = vec![
            bill(3, "LATE", "A", dec!(20000)),
            bill(1, "EARLY", "A", dec!(30000)),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        assert_eq!(
            rows,
            vec![
                row(1, "EARLY", "A", dec!(20000)),
                row(2, "EARLY", "A", dec!(10000)),
                row(3, "LATE", "A", dec!(20000)),
            ]
        );
    }

    #[test]
    fn test_parties_are_independent_and_sorted() {
        let bills = vec![
            bill(1, "X1", "Zeta", dec!(20000)),
            bill(1, "Y1", "Alpha", dec!(20000)),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        assert_eq!(
            rows,
            vec![row(1, "Y1", "Alpha", dec!(20000)), row(1, "X1", "Zeta", dec!(20000))]
        );
    }

    #[test]
    fn test_invalid_cap() {
        assert!(matches!(
            schedule(&[], Decimal::ZERO),
            Err(EngineError::InvalidCap(_))
        ));
        assert!(matches!(
            DailyCapScheduler::new(dec!(-5)),
            Err(EngineError::InvalidCap(_))
        ));
    }

    #[test]
    fn test_non_positive_bill_rejected() {
        // Bills read through serde skip the constructor's validation.
        let json = r#"{"date":"2024-01-01","bill_id":"B1","party":"A","amount":"0"}"#;
        let zero: Bill = serde_json::from_str(json).unwrap();
        assert!(matches!(
            schedule(&[zero], dec!(20000)),
            Err(EngineError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(schedule(&[], dec!(20000)).unwrap().is_empty());
    }

    #[test]
    fn test_rescheduling_output_is_idempotent() {
        let bills = vec![
            bill(1, "B1", "A", dec!(45000)),
            bill(2, "B2", "A", dec!(7000)),
            bill(1, "C1", "B", dec!(19999.99)),
        ];
        let first = schedule(&bills, dec!(20000)).unwrap();
        let again: Vec<Bill> = first.iter().map(|r| r.to_bill().unwrap()).collect();
        assert_eq!(schedule(&again, dec!(20000)).unwrap(), first);
    }
}
