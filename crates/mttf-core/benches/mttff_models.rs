//! Criterion benchmarks for the two MTTFF solvers on the built-in models.
//!
//! The exact solver pays for two symbolic determinants; the asymptotic one
//! only walks the major edges, so the gap widens with redundancy.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mttf_core::models::{nk_fail_graph, nk_le_fail_graph, LatentRates};
use mttf_math::Expr;

fn bench_nk(c: &mut Criterion) {
    let mut group = c.benchmark_group("nk");
    let (n, e, r) = (Expr::symbol("N"), Expr::symbol("e"), Expr::symbol("r"));

    for redundancy in [1u32, 2, 3] {
        let g = nk_fail_graph(&n, redundancy, &e, &r).expect("valid model");
        group.bench_with_input(BenchmarkId::new("exact", redundancy), &g, |b, g| {
            b.iter(|| black_box(g.mttff_exact()));
        });
        group.bench_with_input(BenchmarkId::new("asymptotic", redundancy), &g, |b, g| {
            b.iter(|| black_box(g.mttff_asymptotic()));
        });
    }

    group.finish();
}

fn bench_nk_latent(c: &mut Criterion) {
    let mut group = c.benchmark_group("nk_latent");
    group.sample_size(10);
    let rates = LatentRates {
        e: Expr::symbol("e"),
        r: Expr::symbol("r"),
        es: Expr::symbol("es"),
        rs: Expr::symbol("rs"),
    };

    for redundancy in [1u32, 2] {
        let g = nk_le_fail_graph(&Expr::symbol("N"), redundancy, &rates).expect("valid model");
        group.bench_with_input(BenchmarkId::new("asymptotic", redundancy), &g, |b, g| {
            b.iter(|| black_box(g.mttff_asymptotic()));
        });
        let numeric = nk_le_fail_graph(
            &10.0,
            redundancy,
            &LatentRates { e: 1e-5, r: 0.1, es: 1e-4, rs: 1.0 },
        )
        .expect("valid model");
        group.bench_with_input(BenchmarkId::new("exact_f64", redundancy), &numeric, |b, g| {
            b.iter(|| black_box(g.mttff_exact()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_nk, bench_nk_latent);
criterion_main!(benches);
