//! Splits a total amount across synthesized parties under a per-party ceiling.

use crate::core::error::{EngineError, EngineResult};
use crate::core::money::{ensure_positive, from_cents, to_cents};
use crate::core::party::{Party, PartyName};
use crate::generation::config::GenerationConfig;
use log::{debug, info};
use rand::Rng;
use rust_decimal::Decimal;

/// Cents in one whole currency unit.
const UNIT: i64 = 100;

/// Upper bound on the party list reserved up front.
const MAX_PREALLOCATED: i64 = 1024;

/// Auto-generates a party list whose balances sum exactly to a total.
///
/// Parties are named `<prefix>-001`, `<prefix>-002`, ... in allocation order.
/// The party count is the minimum feasible count `ceil(total / ceiling)`
/// plus a random slack of up to `extra_party_percent` percent. Balances are
/// drawn around the even share, each within `(0, ceiling]`, and the last
/// party receives the exact residual.
#[derive(Debug, Clone)]
pub struct AmountAllocator {
    prefix: String,
    extra_party_percent: u32,
    spread_percent: u32,
}

impl Default for AmountAllocator {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl AmountAllocator {
    pub fn new(prefix: impl Into<String>, extra_party_percent: u32, spread_percent: u32) -> Self {
        Self {
            prefix: prefix.into(),
            extra_party_percent,
            spread_percent,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.party_prefix.trim(),
            config.extra_party_percent,
            config.balance_spread_percent,
        )
    }

    /// Smallest number of parties that can absorb `total` under `ceiling`.
    pub fn minimum_party_count(total: Decimal, ceiling: Decimal) -> EngineResult<usize> {
        let (total_cents, ceiling_cents) = Self::validated_cents(total, ceiling)?;
        Ok(ceil_div(total_cents, ceiling_cents) as usize)
    }

    /// Allocate `total` across freshly named parties, none above `ceiling`.
    pub fn allocate<R: Rng + ?Sized>(
        &self,
        total: Decimal,
        ceiling: Decimal,
        rng: &mut R,
    ) -> EngineResult<Vec<Party>> {
        let (total_cents, ceiling_cents) = Self::validated_cents(total, ceiling)?;

        let minimum = ceil_div(total_cents, ceiling_cents);
        let slack = percent_of(minimum, self.extra_party_percent);
        let count = minimum
            .saturating_add(rng.gen_range(0..=slack))
            .min(total_cents);
        debug!(
            "allocating {} across {} parties (minimum {}, ceiling {})",
            total, count, minimum, ceiling
        );

        let mut parties = Vec::with_capacity(count.min(MAX_PREALLOCATED) as usize);
        let mut remaining = total_cents;
        for index in 0..count {
            let left = count - index;
            let cents = self.draw_balance(remaining, left, ceiling_cents, rng);
            remaining -= cents;
            let name = PartyName::new(format!("{}-{:03}", self.prefix, index + 1))?;
            parties.push(Party::new(name, from_cents(cents))?);
        }

        if remaining != 0 {
            return Err(EngineError::ProcessingFailure(format!(
                "allocation left {} unassigned",
                from_cents(remaining)
            )));
        }
        info!("allocated {} across {} parties", total, parties.len());
        Ok(parties)
    }

    /// Balance for the next party, keeping the rest feasible: each of the
    /// `left - 1` later parties must still fit in `[1 cent, ceiling]`.
    fn draw_balance<R: Rng + ?Sized>(
        &self,
        remaining: i64,
        left: i64,
        ceiling: i64,
        rng: &mut R,
    ) -> i64 {
        let others = left - 1;
        let low = (remaining - others.saturating_mul(ceiling)).max(1);
        let high = ceiling.min(remaining - others);
        if low >= high {
            return low;
        }

        let even = remaining / left;
        let spread = percent_of(even, self.spread_percent);
        let (window_low, window_high) = (
            even.saturating_sub(spread).max(low),
            even.saturating_add(spread).min(high),
        );
        let drawn = if window_low <= window_high {
            rng.gen_range(window_low..=window_high)
        } else {
            rng.gen_range(low..=high)
        };

        let whole = drawn / UNIT * UNIT;
        if whole >= low && whole <= high {
            whole
        } else {
            drawn
        }
    }

    fn validated_cents(total: Decimal, ceiling: Decimal) -> EngineResult<(i64, i64)> {
        ensure_positive(total, "total amount")?;
        ensure_positive(ceiling, "party ceiling")?;
        if ceiling > total {
            return Err(EngineError::InfeasibleAllocation { total, ceiling });
        }
        Ok((to_cents(total)?, to_cents(ceiling)?))
    }
}

/// Both operands are positive.
fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator - 1) / denominator + 1
}

/// `value * percent / 100`, saturating instead of overflowing.
fn percent_of(value: i64, percent: u32) -> i64 {
    let scaled = i128::from(value) * i128::from(percent) / 100;
    i64::try_from(scaled).unwrap_or(i64::MAX)
}
