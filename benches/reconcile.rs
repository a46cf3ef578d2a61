//! Criterion benchmarks for the reconcile path.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::time::SystemTime;

use crossing::prelude::*;

fn make_reconciler() -> Reconciler {
    let mut rec = Reconciler::new(FallbackSimulator::new(FallbackRanges::default(), 42));
    rec.start();
    rec
}

fn bench_settle(c: &mut Criterion) {
    let mut group = c.benchmark_group("settle");

    group.bench_function("remote_reading", |b| {
        let mut rec = make_reconciler();
        let reading = SignalReading {
            counts: Counts::new(10, 2, 0, 7),
            signal: Direction::East,
            manual_override: true,
        };
        b.iter(|| {
            if let Some(a) = rec.begin_attempt() {
                black_box(rec.settle(a, Some(reading), SystemTime::now()));
            }
        });
    });

    group.bench_function("fallback", |b| {
        let mut rec = make_reconciler();
        b.iter(|| {
            if let Some(a) = rec.begin_attempt() {
                black_box(rec.settle(a, None, SystemTime::now()));
            }
        });
    });

    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut sim = FallbackSimulator::new(FallbackRanges::default(), 7);
    c.bench_function("fallback_sample", |b| b.iter(|| black_box(sim.sample())));
}

criterion_group!(benches, bench_settle, bench_sample);
criterion_main!(benches);
