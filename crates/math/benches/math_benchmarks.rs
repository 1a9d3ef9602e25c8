//! Benchmarks for famafrench-math operations.
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use famafrench_math::{
    add_intercept, annualized_volatility, ordinary_least_squares, yearly_to_daily,
};
use ndarray::{Array1, Array2};
use rand::Rng;

fn random_returns(n: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    (0..n).map(|_| rng.r#gen::<f64>() * 0.04 - 0.02).collect()
}

fn random_factors(rows: usize) -> Array2<f64> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((rows, 3), |_| rng.r#gen::<f64>() * 0.02 - 0.01)
}

fn bench_ols(c: &mut Criterion) {
    let mut group = c.benchmark_group("ols_three_factor");

    for n_obs in [60, 250, 500, 2500] {
        group.throughput(Throughput::Elements(n_obs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_obs), &n_obs, |b, &n_obs| {
            let x = add_intercept(&random_factors(n_obs));
            let y = Array1::from(random_returns(n_obs));
            b.iter(|| ordinary_least_squares(black_box(&y), black_box(&x)).unwrap());
        });
    }

    group.finish();
}

fn bench_annualized_volatility(c: &mut Criterion) {
    let mut group = c.benchmark_group("annualized_volatility");

    for size in [250, 500, 2500] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let data = random_returns(size);
            b.iter(|| annualized_volatility(black_box(&data)));
        });
    }

    group.finish();
}

fn bench_yearly_to_daily(c: &mut Criterion) {
    let rates = random_returns(250);
    c.bench_function("yearly_to_daily_250", |b| {
        b.iter(|| rates.iter().map(|r| yearly_to_daily(black_box(*r))).sum::<f64>());
    });
}

criterion_group!(benches, bench_ols, bench_annualized_volatility, bench_yearly_to_daily);

criterion_main!(benches);
