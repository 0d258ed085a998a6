//! Interval calibration tests for forecast confidence intervals.
//!
//! These tests verify that prediction intervals achieve their stated coverage
//! rates using rolling origin evaluation.

use commodity_arima::models::{Arima, ArimaOrder, FitOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Approximately standard normal draws (Irwin-Hall with 12 terms).
fn gaussian_noise(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..12).map(|_| rng.gen::<f64>()).sum::<f64>() - 6.0)
        .collect()
}

fn ar1_series(n: usize, phi: f64, mean: f64, seed: u64) -> Vec<f64> {
    let noise = gaussian_noise(n, seed);
    let mut series = Vec::with_capacity(n);
    let mut level = 0.0;
    for e in noise {
        level = phi * level + e;
        series.push(mean + level);
    }
    series
}

/// Calculate coverage rate: proportion of actuals that fall within intervals.
fn calculate_coverage(actuals: &[f64], lower: &[f64], upper: &[f64]) -> f64 {
    if actuals.is_empty() {
        return 0.0;
    }

    let in_interval = actuals
        .iter()
        .zip(lower.iter().zip(upper.iter()))
        .filter(|(&actual, (&lo, &up))| actual >= lo && actual <= up)
        .count();

    in_interval as f64 / actuals.len() as f64
}

/// Rolling one-step-ahead intervals over the last `origins` points.
fn rolling_one_step(
    series: &[f64],
    order: ArimaOrder,
    origins: usize,
    level: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut actuals = Vec::with_capacity(origins);
    let mut lower = Vec::with_capacity(origins);
    let mut upper = Vec::with_capacity(origins);

    for origin in (series.len() - origins)..series.len() {
        let model = Arima::fit(&series[..origin], order, &FitOptions::default()).unwrap();
        let forecast = model.forecast(1, level).unwrap();

        actuals.push(series[origin]);
        lower.push(forecast.lower().unwrap()[0]);
        upper.push(forecast.upper().unwrap()[0]);
    }

    (actuals, lower, upper)
}

#[test]
fn ar1_95_percent_intervals_cover() {
    let series = ar1_series(260, 0.5, 0.2, 42);
    let (actuals, lower, upper) = rolling_one_step(&series, ArimaOrder::new(1, 0, 0), 60, 0.95);

    let coverage = calculate_coverage(&actuals, &lower, &upper);
    assert!(coverage >= 0.85, "95% interval coverage {coverage:.3}");
}

#[test]
fn ma1_80_percent_intervals_cover() {
    let noise = gaussian_noise(261, 9);
    let series: Vec<f64> = noise.windows(2).map(|w| w[1] + 0.4 * w[0]).collect();
    let (actuals, lower, upper) = rolling_one_step(&series, ArimaOrder::new(0, 0, 1), 60, 0.80);

    let coverage = calculate_coverage(&actuals, &lower, &upper);
    assert!(
        (0.6..=0.97).contains(&coverage),
        "80% interval coverage {coverage:.3}"
    );
}

#[test]
fn wider_level_gives_wider_intervals() {
    let series = ar1_series(200, 0.3, 0.0, 5);
    let model = Arima::fit(&series, ArimaOrder::new(1, 0, 0), &FitOptions::default()).unwrap();

    let narrow = model.forecast(10, 0.80).unwrap();
    let wide = model.forecast(10, 0.95).unwrap();
    for h in 0..10 {
        let narrow_width = narrow.upper().unwrap()[h] - narrow.lower().unwrap()[h];
        let wide_width = wide.upper().unwrap()[h] - wide.lower().unwrap()[h];
        assert!(wide_width > narrow_width);
    }
    assert_eq!(narrow.point(), wide.point());
}
