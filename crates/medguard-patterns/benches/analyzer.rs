//! Pattern Analyzer benchmarks.
//!
//! Run with: cargo bench -p medguard-patterns

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use medguard_patterns::PatternAnalyzer;

fn bench_analyze(c: &mut Criterion) {
    let analyzer = PatternAnalyzer::default();
    let mut group = c.benchmark_group("analyze");

    let codes = [
        ("batch_keyword", "BATCH001"),
        ("known_prefix", "CPL-123456"),
        ("fake_literal", "FAKE0000"),
        ("long_adversarial", "Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9Z9"),
    ];
    for (name, code) in codes {
        group.bench_with_input(BenchmarkId::new("code", name), code, |b, code| {
            b.iter(|| black_box(analyzer.analyze(code, Some("Cipla Limited"))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
