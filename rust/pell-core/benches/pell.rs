use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pell_core::cf::expand_sqrt;
use pell_core::pell::fundamental_solution;

fn bench_expand_sqrt(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_sqrt");

    // Period lengths: 94 -> 16, 9949 -> 217, 1_000_003 -> 458
    for d in [94u64, 9_949, 1_000_003] {
        group.bench_with_input(BenchmarkId::from_parameter(d), &d, |b, &d| {
            b.iter(|| expand_sqrt(black_box(d), 10_000_000));
        });
    }

    group.finish();
}

fn bench_fundamental_solution(c: &mut Criterion) {
    let mut group = c.benchmark_group("fundamental_solution");

    for d in [61u64, 661, 9_949] {
        group.bench_with_input(BenchmarkId::from_parameter(d), &d, |b, &d| {
            b.iter(|| fundamental_solution(black_box(d)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_expand_sqrt, bench_fundamental_solution);
criterion_main!(benches);
