use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use invoice_scheduler::core::bill::Bill;
use invoice_scheduler::core::invoice::DocumentKind;
use invoice_scheduler::core::party::PartyName;
use invoice_scheduler::generation::allocator::AmountAllocator;
use invoice_scheduler::generation::config::AmountRange;
use invoice_scheduler::generation::emitter::{EmissionParams, InvoiceEmitter};
use invoice_scheduler::scheduling::scheduler::DailyCapScheduler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Bills spread over `parties` parties and 90 days, amounts up to 60,000.00.
fn random_bills(parties: usize, bills: usize) -> Vec<Bill> {
    let mut rng = StdRng::seed_from_u64(42);
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let names: Vec<PartyName> = (1..=parties)
        .map(|i| PartyName::new(format!("PARTY-{:03}", i)).unwrap())
        .collect();

    (0..bills)
        .map(|i| {
            let party = names[rng.gen_range(0..names.len())].clone();
            let date = base + Duration::days(rng.gen_range(0..90));
            let amount = Decimal::new(rng.gen_range(100..6_000_000), 2);
            Bill::new(date, format!("B{i}"), party, amount).unwrap()
        })
        .collect()
}

fn bench_schedule_100_bills(c: &mut Criterion) {
    let bills = random_bills(10, 100);
    let scheduler = DailyCapScheduler::new(dec!(20000)).unwrap();

    c.bench_function("schedule_100_bills", |b| {
        b.iter(|| scheduler.schedule(black_box(&bills)))
    });
}

fn bench_schedule_10000_bills(c: &mut Criterion) {
    let bills = random_bills(200, 10_000);
    let scheduler = DailyCapScheduler::new(dec!(20000)).unwrap();

    c.bench_function("schedule_10000_bills", |b| {
        b.iter(|| scheduler.schedule(black_box(&bills)))
    });
}

fn bench_allocate_and_emit(c: &mut Criterion) {
    let params = EmissionParams {
        start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        start_number: 1,
        product: "Cotton Bales".into(),
        rate_range: AmountRange::new(dec!(22.00), dec!(23.00)),
        margin_range: AmountRange::new(dec!(2.25), dec!(2.65)),
        kind: DocumentKind::Sales,
    };
    let allocator = AmountAllocator::default();
    let emitter = InvoiceEmitter::default();

    c.bench_function("allocate_and_emit_10m", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(7);
            let parties = allocator
                .allocate(black_box(dec!(10000000)), dec!(500000), &mut rng)
                .unwrap();
            emitter.emit(&parties, &params, &mut rng).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_schedule_100_bills,
    bench_schedule_10000_bills,
    bench_allocate_and_emit
);
criterion_main!(benches);
