use crate::core::error::{EngineError, EngineResult};
use crate::core::invoice::{effective_rate, DocumentKind, InvoiceRow};
use crate::core::money::{round_money, uniform_decimal, CENT, MONEY_SCALE};
use crate::core::party::Party;
use crate::generation::config::{AmountRange, GenerationConfig};
use chrono::{Days, NaiveDate};
use log::{debug, info};
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};

/// Finest decimal scale tried when solving for a row quantity.
const MAX_QUANTITY_SCALE: u32 = 12;

/// Per-job parameters for invoice emission.
#[derive(Debug, Clone)]
pub struct EmissionParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_number: u64,
    pub product: String,
    pub rate_range: AmountRange,
    pub margin_range: AmountRange,
    pub kind: DocumentKind,
}

impl EmissionParams {
    /// Reject bad date order, bad bounds and a blank product before any draw.
    pub fn validate(&self) -> EngineResult<()> {
        if self.start_date > self.end_date {
            return Err(EngineError::EmptyRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        self.rate_range.validate("rate", false)?;
        self.margin_range.validate("margin", true)?;
        if self.product.trim().is_empty() {
            return Err(EngineError::InvalidInput("product name is required".into()));
        }
        Ok(())
    }
}

/// Turns party balances into numbered, dated invoice rows.
///
/// Every party's balance is invoiced in full: rows are sized within
/// `invoice_value` until the remainder fits in a single row. Rows of one
/// party are emitted together, in the order parties are supplied.
#[derive(Debug, Clone)]
pub struct InvoiceEmitter {
    invoice_value: AmountRange,
    max_day_gap: u32,
}

impl Default for InvoiceEmitter {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl InvoiceEmitter {
    pub fn new(invoice_value: AmountRange, max_day_gap: u32) -> Self {
        Self {
            invoice_value,
            max_day_gap,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.invoice_value, config.max_day_gap)
    }

    pub fn emit<R: Rng + ?Sized>(
        &self,
        parties: &[Party],
        params: &EmissionParams,
        rng: &mut R,
    ) -> EngineResult<Vec<InvoiceRow>> {
        params.validate()?;
        self.invoice_value.validate("invoice value", false)?;

        let product = params.product.trim().to_string();
        let mut number = params.start_number;
        let mut rows = Vec::new();

        for party in parties {
            let mut remaining = party.balance;
            let mut date = self.advance(params.start_date, params.end_date, 0, rng);
            let first_row = rows.len();

            while remaining > Decimal::ZERO {
                let value = self.next_value(remaining, rng);
                let AmountRange { min, max } = params.rate_range;
                let rate = uniform_decimal(rng, min, max, MONEY_SCALE);
                let margin = if params.kind.bears_margin() {
                    let AmountRange { min, max } = params.margin_range;
                    uniform_decimal(rng, min, max, MONEY_SCALE)
                } else {
                    Decimal::ZERO
                };
                let quantity = solve_quantity(value, effective_rate(rate, margin))?;
                remaining -= value;

                rows.push(InvoiceRow {
                    number,
                    date,
                    party: party.name.clone(),
                    product: product.clone(),
                    quantity,
                    rate,
                    margin,
                    amount: value,
                    remaining_balance: remaining,
                });

                number = number.checked_add(1).ok_or_else(|| {
                    EngineError::InvalidInput("invoice number overflow".into())
                })?;
                date = self.advance(date, params.end_date, 1, rng);
            }

            debug!(
                "party {}: {} rows for balance {}",
                party.name,
                rows.len() - first_row,
                party.balance
            );
        }

        info!(
            "emitted {} {} invoices for {} parties",
            rows.len(),
            params.kind,
            parties.len()
        );
        Ok(rows)
    }

    /// Value of the next row given what is left to invoice.
    fn next_value<R: Rng + ?Sized>(&self, remaining: Decimal, rng: &mut R) -> Decimal {
        let AmountRange { min, max } = self.invoice_value;
        if remaining <= max {
            return remaining;
        }
        let upper = max.min(remaining - min);
        if upper < min {
            // Too big for one row, too small to leave a full-sized remainder.
            return round_money(remaining / Decimal::from(2));
        }
        let whole = uniform_decimal(rng, min, upper, 0);
        if whole >= min && whole <= upper {
            whole
        } else {
            uniform_decimal(rng, min, upper, MONEY_SCALE)
        }
    }

    /// Move the date cursor forward by a random gap, never past `end`.
    fn advance<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        end: NaiveDate,
        min_gap: u32,
        rng: &mut R,
    ) -> NaiveDate {
        let gap = rng.gen_range(min_gap..=self.max_day_gap.max(min_gap));
        date.checked_add_days(Days::new(u64::from(gap)))
            .map_or(end, |next| next.min(end))
    }
}

/// Find a positive quantity `q` with `round(q * effective_rate, 2) == value`.
///
/// The quantity scale is the coarsest at which one quantity step moves the
/// amount by at most a cent, so the nearest grid point (or a neighbour of
/// it, on a half-cent tie) always reproduces `value` exactly.
pub fn solve_quantity(value: Decimal, effective_rate: Decimal) -> EngineResult<Decimal> {
    if value <= Decimal::ZERO || effective_rate <= Decimal::ZERO {
        return Err(EngineError::ProcessingFailure(format!(
            "cannot price value {value} at rate {effective_rate}"
        )));
    }

    let mut scale = 0;
    while scale < MAX_QUANTITY_SCALE && effective_rate * Decimal::new(1, scale) > CENT {
        scale += 1;
    }

    let nearest = (value / effective_rate)
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    let step = Decimal::new(1, scale);
    [nearest, nearest - step, nearest + step]
        .into_iter()
        .find(|q| *q > Decimal::ZERO && round_money(*q * effective_rate) == value)
        .map(|q| q.normalize())
        .ok_or_else(|| {
            EngineError::ProcessingFailure(format!(
                "no quantity reproduces {value} at rate {effective_rate}"
            ))
        })
}
