use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mmm_core::expr::evaluate;
use mmm_core::generators::{ChallengeGenerator, QuotesGenerator};
use mmm_core::quote_bank::QuoteBank;
use mmm_core::{ChallengeKind, ChallengeSettings};

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    group.bench_function("short", |b| b.iter(|| evaluate(black_box("12 + 7 * 3"))));

    let long = (1..=200)
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" + ");
    group.bench_function("200 operands", |b| b.iter(|| evaluate(black_box(&long))));

    group.bench_function("mixed operators", |b| {
        b.iter(|| evaluate(black_box("81 / 9 - -4 * 12 + 7 / 3 - 100")))
    });

    group.finish();
}

fn bench_quote_hiding(c: &mut Criterion) {
    let mut group = c.benchmark_group("quote_hiding");

    for level in [1u32, 5, 10] {
        group.bench_function(format!("level {level}"), |b| {
            let mut settings = ChallengeSettings::defaults_for(ChallengeKind::Quotes);
            settings.level = level;
            let mut generator = QuotesGenerator::new(QuoteBank::default(), None, None);
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| {
                generator
                    .new_challenge(black_box(&mut settings), &mut rng, true)
                    .ok()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_quote_hiding);
criterion_main!(benches);
