use crate::core::bill::PaymentRow;
use crate::core::party::PartyName;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-party view of a finished payment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartySchedule {
    pub party: PartyName,
    pub total_paid: Decimal,
    /// Distinct days on which the party receives a payment.
    pub payment_days: usize,
    pub first_payment: NaiveDate,
    pub last_payment: NaiveDate,
    pub bills: usize,
    /// Bills whose payment is spread over more than one day.
    pub split_bills: usize,
    /// Largest amount paid to the party on a single day.
    pub peak_day_total: Decimal,
}

/// Report over a payment schedule, one entry per party in name order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub parties: Vec<PartySchedule>,
    pub total_paid: Decimal,
    pub payment_rows: usize,
}

impl ScheduleSummary {
    pub fn from_rows(rows: &[PaymentRow]) -> Self {
        let mut grouped: BTreeMap<&PartyName, Vec<&PaymentRow>> = BTreeMap::new();
        for row in rows {
            grouped.entry(&row.party).or_default().push(row);
        }

        let parties = grouped
            .into_iter()
            .filter_map(|(party, rows)| summarize_party(party, &rows))
            .collect();

        Self {
            parties,
            total_paid: rows.iter().map(|r| r.amount).sum(),
            payment_rows: rows.len(),
        }
    }

    pub fn party(&self, name: &PartyName) -> Option<&PartySchedule> {
        self.parties.iter().find(|p| &p.party == name)
    }
}

fn summarize_party(party: &PartyName, rows: &[&PaymentRow]) -> Option<PartySchedule> {
    let first_payment = rows.iter().map(|r| r.date).min()?;
    let last_payment = rows.iter().map(|r| r.date).max()?;

    let mut per_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut bill_days: BTreeMap<&str, BTreeSet<NaiveDate>> = BTreeMap::new();
    for row in rows {
        *per_day.entry(row.date).or_insert(Decimal::ZERO) += row.amount;
        bill_days.entry(row.bill_id.as_str()).or_default().insert(row.date);
    }

    Some(PartySchedule {
        party: party.clone(),
        total_paid: per_day.values().sum(),
        payment_days: per_day.len(),
        first_payment,
        last_payment,
        bills: bill_days.len(),
        split_bills: bill_days.values().filter(|days| days.len() > 1).count(),
        peak_day_total: per_day.values().copied().max().unwrap_or(Decimal::ZERO),
    })
}

impl std::fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Payment Schedule ===")?;
        writeln!(f, "Payments:   {}", self.payment_rows)?;
        writeln!(f, "Total Paid: {}", self.total_paid)?;

        writeln!(f, "\nPer-Party:")?;
        for p in &self.parties {
            writeln!(
                f,
                "  {}: {} over {} day(s) ({} to {}), peak {}, {}/{} bills split",
                p.party,
                p.total_paid,
                p.payment_days,
                p.first_payment,
                p.last_payment,
                p.peak_day_total,
                p.split_bills,
                p.bills
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bill::Bill;
    use crate::scheduling::scheduler::schedule;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_summary_of_split_schedule() {
        let a = PartyName::new("PartyA").unwrap();
        let bills = vec![
            Bill::new(day(1), "B1", a.clone(), dec!(25000)).unwrap(),
            Bill::new(day(1), "B2", a.clone(), dec!(10000)).unwrap(),
        ];
        let rows = schedule(&bills, dec!(20000)).unwrap();
        let summary = ScheduleSummary::from_rows(&rows);

        assert_eq!(summary.payment_rows, 3);
        assert_eq!(summary.total_paid, dec!(35000));
        let party = summary.party(&a).unwrap();
        assert_eq!(party.payment_days, 2);
        assert_eq!(party.first_payment, day(1));
        assert_eq!(party.last_payment, day(2));
        assert_eq!(party.bills, 2);
        assert_eq!(party.split_bills, 1);
        assert_eq!(party.peak_day_total, dec!(20000));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ScheduleSummary::from_rows(&[]);
        assert!(summary.parties.is_empty());
        assert_eq!(summary.total_paid, Decimal::ZERO);
        assert!(summary.to_string().contains("Payments:   0"));
    }
}
