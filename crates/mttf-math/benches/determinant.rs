//! Criterion benchmarks for `mttf-math`.
//!
//! The symbolic determinant dominates exact MTTFF computation, so the
//! benchmark uses generator-shaped tridiagonal matrices.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mttf_math::{Expr, Matrix};

/// Birth-death generator over `n` states with symbolic rates `e` and `r`.
fn birth_death<T, F>(n: usize, rate: F) -> Matrix<T>
where
    T: mttf_math::Scalar,
    F: Fn(&str, i64) -> T,
{
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        let fail = rate("e", (n - i) as i64);
        let repair = rate("r", 1);
        let mut diag = -fail.clone();
        if i + 1 < n {
            m.set(i, i + 1, fail).ok();
        }
        if i > 0 {
            m.set(i, i - 1, repair.clone()).ok();
            diag = diag - repair;
        }
        m.set(i, i, diag).ok();
    }
    m
}

fn bench_determinant(c: &mut Criterion) {
    let mut group = c.benchmark_group("determinant");

    for n in [2usize, 4, 6] {
        let symbolic = birth_death(n, |v, k| Expr::symbol(v) * Expr::integer(k));
        group.bench_with_input(BenchmarkId::new("symbolic", n), &symbolic, |b, m| {
            b.iter(|| black_box(m.determinant()));
        });

        let numeric = birth_death(n, |v, k| if v == "e" { 1e-3 * k as f64 } else { 0.5 });
        group.bench_with_input(BenchmarkId::new("f64", n), &numeric, |b, m| {
            b.iter(|| black_box(m.determinant()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_determinant);
criterion_main!(benches);
