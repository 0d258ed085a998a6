//! Benchmarks for ARIMA estimation and forecasting on daily changes.

use commodity_arima::features::{acf, pacf};
use commodity_arima::models::{Arima, ArimaOrder, FitOptions};
use commodity_arima::validation::adf_test;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Deterministic AR(1)-like change series.
fn generate_changes(n: usize) -> Vec<f64> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut change = 0.0;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let shock = (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5;
            change = 0.5 * change + shock;
            change
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("arima_fit");

    for size in [250, 1000, 4000].iter() {
        let changes = generate_changes(*size);
        for order in [ArimaOrder::new(1, 0, 0), ArimaOrder::new(1, 0, 1), ArimaOrder::new(2, 1, 2)] {
            group.bench_with_input(BenchmarkId::new(order.to_string(), size), size, |b, _| {
                b.iter(|| Arima::fit(black_box(&changes), order, &FitOptions::default()))
            });
        }
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let changes = generate_changes(1000);
    let model = Arima::fit(&changes, ArimaOrder::new(1, 0, 1), &FitOptions::default())
        .expect("fit benchmark model");

    let mut group = c.benchmark_group("arima_forecast");
    for horizon in [30, 365, 7000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(horizon), horizon, |b, &h| {
            b.iter(|| model.forecast(black_box(h), 0.95))
        });
    }
    group.bench_function("dynamic_predict", |b| {
        b.iter(|| model.predict(black_box(250), 999, true))
    });
    group.finish();
}

fn bench_diagnostics(c: &mut Criterion) {
    let changes = generate_changes(4000);

    c.bench_function("acf_28", |b| b.iter(|| acf(black_box(&changes), 28)));
    c.bench_function("pacf_28", |b| b.iter(|| pacf(black_box(&changes), 28)));
    c.bench_function("adf_test", |b| b.iter(|| adf_test(black_box(&changes), None)));
}

criterion_group!(benches, bench_fit, bench_forecast, bench_diagnostics);
criterion_main!(benches);
