//! Invoice generation example.
//!
//! Splits a total across synthesized parties, then invoices every party's
//! balance. A fixed seed makes the output reproducible.

use chrono::NaiveDate;
use invoice_scheduler::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  invoice-scheduler: Invoice Generation     ║");
    println!("╚════════════════════════════════════════════╝\n");

    let mut rng = StdRng::seed_from_u64(7);
    let config = GenerationConfig::default();

    // --- Allocation ---
    let total = dec!(100000);
    let ceiling = dec!(20000);
    let parties = match AmountAllocator::from_config(&config).allocate(total, ceiling, &mut rng) {
        Ok(parties) => parties,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    println!(
        "━━━ {} split across {} parties (ceiling {}) ━━━\n",
        total,
        parties.len(),
        ceiling
    );
    for party in &parties {
        println!("  {:<10} {:>10}", party.name, party.balance);
    }
    println!();

    // --- Emission ---
    let (Some(start_date), Some(end_date)) = (
        NaiveDate::from_ymd_opt(2024, 4, 1),
        NaiveDate::from_ymd_opt(2024, 6, 30),
    ) else {
        return;
    };
    let params = EmissionParams {
        start_date,
        end_date,
        start_number: 1,
        product: "Cotton Bales".into(),
        rate_range: config.rate_range,
        margin_range: config.margin_range,
        kind: config.document_kind,
    };
    let rows = match InvoiceEmitter::from_config(&config).emit(&parties, &params, &mut rng) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    println!("━━━ Invoices ━━━\n");
    for row in &rows {
        println!(
            "  {}  {}  {:<10} {:>10} kg × {:>6} (+{}%) = {:>10}   left {:>10}",
            row.label(),
            row.date,
            row.party,
            row.quantity,
            row.rate,
            row.margin,
            row.amount,
            row.remaining_balance
        );
    }

    let invoiced: Decimal = rows.iter().map(|r| r.amount).sum();
    println!("\n  {} invoices, total {}", rows.len(), invoiced);
}
