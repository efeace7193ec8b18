//! invoice-scheduler CLI
//!
//! Generate invoices or build a daily-capped payment schedule from the
//! command line. Tabular output goes to stdout (or `--output`); logs and
//! summaries go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Invoice a list of parties (rows of "name, balance")
//! invoice-scheduler generate --start 2024-04-01 --end 2024-04-30 \
//!     --number 1 --product "Cotton Bales" --parties parties.csv
//!
//! # Synthesize parties from a total and a per-party ceiling
//! invoice-scheduler generate --start 2024-04-01 --end 2024-04-30 \
//!     --number 1 --product "Cotton Bales" --total 100000 --ceiling 20000 --seed 7
//!
//! # Split bills into a payment schedule under the daily cap
//! invoice-scheduler schedule --input bills.csv --cap 20000
//! ```

use chrono::NaiveDate;
use invoice_scheduler::codec::DecodeOptions;
use invoice_scheduler::core::invoice::DocumentKind;
use invoice_scheduler::core::money::{parse_date, parse_decimal};
use invoice_scheduler::generation::config::GenerationConfig;
use invoice_scheduler::pipeline::{
    generate_invoices, schedule_payments, InvoiceRequest, JobFailure, JobOutput, PartySource,
};
use invoice_scheduler::scheduling::scheduler::ScheduleConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::fs;
use std::io::{self, Read};
use std::process;

fn print_usage() {
    eprintln!(
        r#"invoice-scheduler: invoice generation and daily-cap payment scheduling

USAGE:
    invoice-scheduler <COMMAND> [OPTIONS]

COMMANDS:
    generate    Generate invoice rows for a set of parties
    schedule    Split bills into a payment schedule under a daily cap
    help        Show this message

OPTIONS (generate):
    --start <DATE>          First invoice date (YYYY-MM-DD)
    --end <DATE>            Last invoice date (YYYY-MM-DD)
    --number <N>            Starting invoice number
    --product <NAME>        Product name printed on every row
    --parties <FILE>        Party rows "name, balance" (manual mode)
    --total <AMOUNT>        Total to allocate across synthesized parties
    --ceiling <AMOUNT>      Maximum balance per synthesized party
    --rate-min <R>          Minimum rate (default: 22.00)
    --rate-max <R>          Maximum rate (default: 23.00)
    --margin-min <P>        Minimum margin percent (default: 2.25)
    --margin-max <P>        Maximum margin percent (default: 2.65)
    --kind <KIND>           sales (with margin, default) or purchase
    --normalize-unr         Rewrite party names with the "UNR- " prefix
    --seed <N>              Seed the random draws for reproducible output
    --config <FILE>         JSON generation config

OPTIONS (schedule):
    --input <FILE>          Bill rows "date, bill, party, amount" ("-" for stdin)
    --cap <AMOUNT>          Daily cap per party (default: 20000)
    --skip-summary-rows     Ignore total rows without a date
    --format <FORMAT>       Summary format on stderr: text (default) or json

COMMON:
    --output <FILE>         Write the table to a file instead of stdout

EXAMPLES:
    invoice-scheduler generate --start 2024-04-01 --end 2024-04-30 --number 1 --product Cotton --parties parties.csv
    invoice-scheduler generate --start 2024-04-01 --end 2024-04-30 --number 1 --product Cotton --total 100000 --ceiling 20000
    invoice-scheduler schedule --input bills.csv --output payments.csv"#
    );
}

fn fail(message: impl AsRef<str>) -> ! {
    eprintln!("Error: {}", message.as_ref());
    process::exit(1);
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> &'a str {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .unwrap_or_else(|| fail(format!("{flag} requires a value")))
}

fn decimal_arg(raw: &str, flag: &str) -> Decimal {
    parse_decimal(raw).unwrap_or_else(|| fail(format!("{flag}: invalid number '{raw}'")))
}

fn date_arg(raw: &str, flag: &str) -> NaiveDate {
    parse_date(raw).unwrap_or_else(|| fail(format!("{flag}: invalid date '{raw}'")))
}

fn read_input(path: &str) -> String {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .unwrap_or_else(|e| fail(format!("reading stdin: {e}")));
        return buffer;
    }
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("reading file '{path}': {e}")))
}

fn deliver(result: Result<JobOutput, JobFailure>, output_path: Option<&str>) {
    let output = result.unwrap_or_else(|failure| fail(failure.to_string()));
    match output_path {
        Some(path) => {
            fs::write(path, &output.body)
                .unwrap_or_else(|e| fail(format!("writing to '{path}': {e}")));
            eprintln!("Wrote {} rows → {} ({})", output.rows, path, output.filename);
        }
        None => print!("{}", output.body),
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = GenerationConfig::default();
    let mut start = None;
    let mut end = None;
    let mut number = None;
    let mut product = None;
    let mut parties_path = None;
    let mut total = None;
    let mut ceiling = None;
    let mut seed: Option<u64> = None;
    let mut output_path = None;

    // --config is applied first so explicit flags override it.
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        let path = args
            .get(pos + 1)
            .unwrap_or_else(|| fail("--config requires a file path"));
        config = serde_json::from_str(&read_input(path))
            .unwrap_or_else(|e| fail(format!("parsing config '{path}': {e}")));
    }

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--start" => start = Some(date_arg(value(args, &mut i, flag), flag)),
            "--end" => end = Some(date_arg(value(args, &mut i, flag), flag)),
            "--number" => {
                let raw = value(args, &mut i, flag);
                number = Some(
                    raw.parse::<u64>()
                        .unwrap_or_else(|_| fail(format!("--number: invalid number '{raw}'"))),
                );
            }
            "--product" => product = Some(value(args, &mut i, flag).to_string()),
            "--parties" => parties_path = Some(value(args, &mut i, flag).to_string()),
            "--total" => total = Some(decimal_arg(value(args, &mut i, flag), flag)),
            "--ceiling" => ceiling = Some(decimal_arg(value(args, &mut i, flag), flag)),
            "--rate-min" => config.rate_range.min = decimal_arg(value(args, &mut i, flag), flag),
            "--rate-max" => config.rate_range.max = decimal_arg(value(args, &mut i, flag), flag),
            "--margin-min" => {
                config.margin_range.min = decimal_arg(value(args, &mut i, flag), flag)
            }
            "--margin-max" => {
                config.margin_range.max = decimal_arg(value(args, &mut i, flag), flag)
            }
            "--kind" => {
                config.document_kind = value(args, &mut i, flag)
                    .parse::<DocumentKind>()
                    .unwrap_or_else(|e| fail(e));
            }
            "--normalize-unr" => config.normalize_unregistered = true,
            "--seed" => {
                let raw = value(args, &mut i, flag);
                seed = Some(
                    raw.parse()
                        .unwrap_or_else(|_| fail(format!("--seed: invalid number '{raw}'"))),
                );
            }
            "--config" => {
                value(args, &mut i, flag);
            }
            "--output" => output_path = Some(value(args, &mut i, flag).to_string()),
            _ => fail(format!("Unknown option: {flag}")),
        }
        i += 1;
    }

    let parties = match (parties_path, total, ceiling) {
        (Some(path), None, None) => PartySource::Manual(read_input(&path)),
        (None, Some(total), Some(ceiling)) => PartySource::Generated { total, ceiling },
        _ => fail("use either --parties <FILE> or both --total and --ceiling"),
    };

    let request = InvoiceRequest::new(
        start.unwrap_or_else(|| fail("--start <DATE> is required")),
        end.unwrap_or_else(|| fail("--end <DATE> is required")),
        number.unwrap_or_else(|| fail("--number <N> is required")),
        product.unwrap_or_else(|| fail("--product <NAME> is required")),
        parties,
        &config,
    );

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    deliver(
        generate_invoices(&request, &config, &mut rng),
        output_path.as_deref(),
    );
}

fn cmd_schedule(args: &[String]) {
    let mut config = ScheduleConfig::default();
    let mut options = DecodeOptions::default();
    let mut input_path = None;
    let mut output_path = None;
    let mut format = "text".to_string();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--input" => input_path = Some(value(args, &mut i, flag).to_string()),
            "--cap" => config.daily_cap = decimal_arg(value(args, &mut i, flag), flag),
            "--skip-summary-rows" => options.skip_summary_rows = true,
            "--format" => format = value(args, &mut i, flag).to_string(),
            "--output" => output_path = Some(value(args, &mut i, flag).to_string()),
            _ => fail(format!("Unknown option: {flag}")),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let input = read_input(&path);
    let today = chrono::Local::now().date_naive();

    let result = schedule_payments(&input, &config, &options, today).map(|(output, summary)| {
        if format == "json" {
            match serde_json::to_string_pretty(&summary) {
                Ok(json) => eprintln!("{json}"),
                Err(e) => eprintln!("Error rendering summary: {e}"),
            }
        } else {
            eprintln!("{summary}");
        }
        output
    });
    deliver(result, output_path.as_deref());
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "generate" => cmd_generate(rest),
        "schedule" => cmd_schedule(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
