//! Daily-cap payment scheduling example.
//!
//! Splits a handful of bills into a payment schedule where no party is
//! paid more than 20,000 on any single day.

use invoice_scheduler::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  invoice-scheduler: Daily Cap Scheduling   ║");
    println!("╚════════════════════════════════════════════╝\n");

    let input = "\
Date,Bill,Party Name,Amount
01-01-2024,B1,PartyA,25000
01-01-2024,B2,PartyA,10000
03-01-2024,C7,PartyB,41000.75
,,TOTAL,76000.75
";

    // Spreadsheet exports often end with a total row; drop it.
    let options = DecodeOptions {
        skip_summary_rows: true,
    };
    let bills: Vec<Bill> = match decode(input, &options) {
        Ok(bills) => bills,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    println!("━━━ Bills ━━━\n");
    for bill in &bills {
        println!(
            "  {}  {:<4} {:<8} {:>10}",
            bill.date(),
            bill.bill_id(),
            bill.party(),
            bill.amount()
        );
    }
    println!();

    let scheduler = match DailyCapScheduler::new(dec!(20000)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };
    let rows = match scheduler.schedule(&bills) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    println!("━━━ Payments (cap {}) ━━━\n", scheduler.cap());
    for row in &rows {
        println!(
            "  {}  {:<4} {:<8} {:>10}",
            row.date, row.bill_id, row.party, row.amount
        );
    }
    println!();

    println!("{}", ScheduleSummary::from_rows(&rows));

    match encode(&rows) {
        Ok(text) => println!("━━━ CSV ━━━\n\n{text}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
