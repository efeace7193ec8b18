//! Shared numeric and date helpers.
//!
//! All money is [`Decimal`] with a smallest unit of one cent (0.01).
//! Rounding is half-away-from-zero throughout.

use crate::core::error::{EngineError, EngineResult};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places carried by money amounts.
pub const MONEY_SCALE: u32 = 2;

/// The smallest currency unit.
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, MONEY_SCALE);

/// Date layout written to tabular output.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

const ACCEPTED_DATE_FORMATS: [&str; 3] = ["%d-%m-%Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Round to whole cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `amount` carries no precision below one cent.
pub fn is_whole_cents(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Validate a strictly positive money amount with at most cent precision.
pub fn ensure_positive(amount: Decimal, what: &str) -> EngineResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::invalid_amount(
            amount,
            format!("{what} must be positive"),
        ));
    }
    if !is_whole_cents(amount) {
        return Err(EngineError::invalid_amount(
            amount,
            format!("{what} has precision below one cent"),
        ));
    }
    Ok(amount)
}

/// Convert a cent-precise amount to an integer count of cents.
pub fn to_cents(amount: Decimal) -> EngineResult<i64> {
    if !is_whole_cents(amount) {
        return Err(EngineError::invalid_amount(
            amount,
            "precision below one cent",
        ));
    }
    (amount * Decimal::ONE_HUNDRED)
        .to_i64()
        .ok_or_else(|| EngineError::invalid_amount(amount, "out of range"))
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_SCALE)
}

/// Draw a value uniformly from `[low, high]` on a grid of `10^-scale`.
///
/// Both bounds must be representable at `scale`; the grid endpoints are
/// rounded inward so the draw never leaves the closed interval.
pub fn uniform_decimal<R: Rng + ?Sized>(
    rng: &mut R,
    low: Decimal,
    high: Decimal,
    scale: u32,
) -> Decimal {
    let factor = Decimal::from(10i64.pow(scale));
    let lo = (low * factor).ceil().to_i64().unwrap_or(0);
    let hi = (high * factor).floor().to_i64().unwrap_or(lo);
    if hi <= lo {
        return Decimal::new(lo, scale);
    }
    Decimal::new(rng.gen_range(lo..=hi), scale)
}

/// Render a money amount with exactly two decimal places.
pub fn format_money(amount: Decimal) -> String {
    let mut rounded = round_money(amount);
    rounded.rescale(MONEY_SCALE);
    rounded.to_string()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a calendar date in any of the accepted layouts
/// (`DD-MM-YYYY`, `YYYY-MM-DD`, `DD/MM/YYYY`).
///
/// The year must have four digits; `01-02-24` is rejected rather than
/// read as the year 24.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    ACCEPTED_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .filter(|date| (1000..=9999).contains(&date.year()))
}

/// Parse a decimal number, tolerating thousands separators and a leading currency sign.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches(['₹', '$'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(1.004)), dec!(1.00));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(dec!(123.45)).unwrap(), 12345);
        assert_eq!(from_cents(12345), dec!(123.45));
        assert!(to_cents(dec!(0.001)).is_err());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(dec!(10.50), "amount").is_ok());
        assert!(ensure_positive(dec!(10.500), "amount").is_ok());
        assert!(ensure_positive(Decimal::ZERO, "amount").is_err());
        assert!(ensure_positive(dec!(-1), "amount").is_err());
        assert!(ensure_positive(dec!(1.234), "amount").is_err());
    }

    #[test]
    fn test_uniform_decimal_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = uniform_decimal(&mut rng, dec!(22.00), dec!(23.00), 2);
            assert!(v >= dec!(22.00) && v <= dec!(23.00));
            assert!(v.scale() <= 2);
        }
    }

    #[test]
    fn test_uniform_decimal_degenerate_range() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(uniform_decimal(&mut rng, dec!(5), dec!(5), 2), dec!(5));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(20000)), "20000.00");
        assert_eq!(format_money(dec!(0.5)), "0.50");
        assert_eq!(format_money(dec!(12.345)), "12.35");
    }

    #[test]
    fn test_parse_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("15-01-2024"), Some(expected));
        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date(" 15/01/2024 "), Some(expected));
        assert_eq!(parse_date("Total"), None);
    }

    #[test]
    fn test_parse_date_requires_four_digit_year() {
        assert_eq!(parse_date("01-02-24"), None);
        assert_eq!(parse_date("1/2/24"), None);
        assert_eq!(parse_date("24-02-01"), None);
        assert_eq!(parse_date("01-02-0024"), None);
        assert_eq!(
            parse_date("01-02-2024"),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("25,000.50"), Some(dec!(25000.50)));
        assert_eq!(parse_decimal(" 100 "), Some(dec!(100)));
        assert_eq!(parse_decimal("₹1500"), Some(dec!(1500)));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }
}
