// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — QCore Dynamics Benchmarks
// ─────────────────────────────────────────────────────────────────────

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qcore_dynamics::{BayesianAttractor, DecoherenceFilter, PhaseScheduler};
use qcore_math::Fixed;

fn bench_attractor_update(c: &mut Criterion) {
    let mut a = BayesianAttractor::default();
    let mut n = 0i32;
    c.bench_function("attractor_update", |b| {
        b.iter(|| {
            n = (n + 1) % 128;
            a.update(black_box(Fixed::from_int(n)), black_box(Fixed::from_int(n & 1)));
        })
    });
}

fn bench_mahalanobis(c: &mut Criterion) {
    let mut a = BayesianAttractor::default();
    for i in 0..256 {
        a.update(Fixed::from_int(i % 128), Fixed::from_int(i & 1));
    }
    c.bench_function("mahalanobis_sq", |b| {
        b.iter(|| a.mahalanobis_sq(black_box(Fixed::from_int(64)), black_box(Fixed::ONE)))
    });
}

fn bench_filter_update(c: &mut Criterion) {
    let mut f = DecoherenceFilter::default();
    c.bench_function("decoherence_update", |b| {
        b.iter(|| f.update(black_box(Fixed::from_int(2)), black_box(1)))
    });
}

fn bench_scheduler(c: &mut Criterion) {
    let mut s = PhaseScheduler::default();
    c.bench_function("scheduler_next_phase", |b| b.iter(|| s.next_phase()));
}

criterion_group!(
    benches,
    bench_attractor_update,
    bench_mahalanobis,
    bench_filter_update,
    bench_scheduler
);
criterion_main!(benches);
