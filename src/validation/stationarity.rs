//! Stationarity tests for time series.
//!
//! Provides the augmented Dickey-Fuller unit root test.

use crate::utils::ols::{ols_fit, OlsFit};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

/// Result of a stationarity test.
#[derive(Debug, Clone, Serialize)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences used
    pub lags: usize,
    /// Observations in the final regression
    pub n_obs: usize,
    /// Whether series appears stationary at 5%
    pub is_stationary: bool,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

impl StationarityResult {
    fn undefined(lags: usize) -> Self {
        Self {
            statistic: f64::NAN,
            p_value: f64::NAN,
            lags,
            n_obs: 0,
            is_stationary: false,
            critical_values: CriticalValues::default(),
        }
    }
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

impl CriticalValues {
    /// MacKinnon (2010) response surface for the constant-only regression.
    pub fn mackinnon_constant(n_obs: usize) -> Self {
        let n = n_obs as f64;
        let surface = |b: [f64; 4]| b[0] + b[1] / n + b[2] / (n * n) + b[3] / (n * n * n);
        Self {
            cv_1pct: surface([-3.43035, -6.5393, -16.786, -79.433]),
            cv_5pct: surface([-2.86154, -2.8903, -4.234, -40.040]),
            cv_10pct: surface([-2.56677, -1.5384, -2.809, 0.0]),
        }
    }
}

/// Augmented Dickey-Fuller test for unit root (non-stationarity).
///
/// Tests null hypothesis that series has a unit root (non-stationary).
/// Rejection implies stationarity.
///
/// The regression is `Δy_t = α + β y_{t-1} + Σ γ_i Δy_{t-i} + ε_t`. The lag
/// order is picked by AIC over a common sample, then the chosen model is
/// refitted on all usable observations.
///
/// # Arguments
/// * `series` - Time series data
/// * `max_lags` - Maximum lags to consider (default: ceil(12 * (n/100)^(1/4)))
pub fn adf_test(series: &[f64], max_lags: Option<usize>) -> StationarityResult {
    let n = series.len();

    if n < 4 {
        warn!(n_obs = n, "ADF test needs at least 4 observations");
        return StationarityResult::undefined(0);
    }

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lags = max_lags.unwrap_or(default_lags).min(n / 2 - 2);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let best_lag = select_lag_aic(series, &diff, max_lags);

    let fit = match adf_regression(series, &diff, best_lag, diff.len() - best_lag) {
        Some(fit) => fit,
        None => return StationarityResult::undefined(best_lag),
    };

    let statistic = fit.t_stat(1);
    if !statistic.is_finite() {
        return StationarityResult::undefined(best_lag);
    }

    let critical_values = CriticalValues::mackinnon_constant(fit.n_obs);
    let p_value = mackinnon_p_value(statistic);
    debug!(statistic, p_value, lags = best_lag, "ADF test");

    StationarityResult {
        statistic,
        p_value,
        lags: best_lag,
        n_obs: fit.n_obs,
        is_stationary: statistic < critical_values.cv_5pct,
        critical_values,
    }
}

/// Select lag order using AIC on the sample usable at `max_lags`.
fn select_lag_aic(level: &[f64], diff: &[f64], max_lags: usize) -> usize {
    let n_obs = diff.len() - max_lags;
    let mut best_lag = 0;
    let mut best_aic = f64::INFINITY;

    for lag in 0..=max_lags {
        let aic = adf_regression(level, diff, lag, n_obs)
            .map(|fit| fit.aic())
            .unwrap_or(f64::INFINITY);
        if aic < best_aic {
            best_aic = aic;
            best_lag = lag;
        }
    }

    best_lag
}

/// OLS of `diff[t]` on `[1, level[t], diff[t-1], .., diff[t-lag]]` over the
/// last `n_obs` differences.
fn adf_regression(level: &[f64], diff: &[f64], lag: usize, n_obs: usize) -> Option<OlsFit> {
    let m = diff.len();
    if n_obs == 0 || n_obs + lag > m {
        return None;
    }

    let mut y = Vec::with_capacity(n_obs);
    let mut rows = Vec::with_capacity(n_obs);
    for t in (m - n_obs)..m {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(level[t]);
        row.extend((1..=lag).map(|j| diff[t - j]));
        rows.push(row);
        y.push(diff[t]);
    }

    ols_fit(&y, &rows).ok()
}

/// MacKinnon (1994) approximate p-value for the constant-only ADF statistic.
fn mackinnon_p_value(statistic: f64) -> f64 {
    const TAU_MAX: f64 = 2.74;
    const TAU_MIN: f64 = -18.83;
    const TAU_STAR: f64 = -1.61;
    const SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
    const LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &SMALL_P
    } else {
        &LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * statistic + c);

    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(z),
        Err(_) => f64::NAN,
    }
}
