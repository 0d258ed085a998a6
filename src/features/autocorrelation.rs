//! Sample autocorrelation and partial autocorrelation.
//!
//! Both use the biased autocovariance (denominator `n`), which keeps the
//! implied autocorrelation matrix positive semi-definite.

use crate::error::{AnalysisError, Result};
use crate::utils::stats::{mean, quantile_normal};
use serde::Serialize;

/// Correlation coefficients for lags `0..=max_lag` with confidence bands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlogram {
    /// Coefficient per lag; index equals lag.
    pub values: Vec<f64>,
    /// Half-width of the confidence band around zero per lag.
    pub half_widths: Vec<f64>,
    /// Confidence level of the band.
    pub level: f64,
}

impl Correlogram {
    pub fn max_lag(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// Lags (excluding 0) whose coefficient falls outside the band.
    pub fn significant_lags(&self) -> Vec<usize> {
        self.values
            .iter()
            .zip(&self.half_widths)
            .enumerate()
            .skip(1)
            .filter(|(_, (v, w))| v.abs() > **w)
            .map(|(lag, _)| lag)
            .collect()
    }
}

/// Returns the autocorrelation at a specific lag.
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    if series.len() <= lag {
        return f64::NAN;
    }

    let m = mean(series);

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (i, &x) in series.iter().enumerate() {
        denominator += (x - m).powi(2);
        if i >= lag {
            numerator += (x - m) * (series[i - lag] - m);
        }
    }

    if denominator < 1e-10 {
        return 0.0;
    }

    numerator / denominator
}

/// Autocorrelations for lags `0..=nlags`.
pub fn acf(series: &[f64], nlags: usize) -> Result<Vec<f64>> {
    check_lags(series, nlags)?;
    Ok((0..=nlags).map(|k| autocorrelation(series, k)).collect())
}

/// Partial autocorrelations for lags `0..=nlags` by Durbin-Levinson.
///
/// Lag 0 is 1 by convention.
pub fn pacf(series: &[f64], nlags: usize) -> Result<Vec<f64>> {
    let r = acf(series, nlags)?;
    let mut out = vec![1.0];
    if nlags == 0 {
        return Ok(out);
    }

    let mut phi_prev: Vec<f64> = vec![r[1]];
    out.push(r[1]);

    for k in 2..=nlags {
        let mut num = r[k];
        let mut denom = 1.0;
        for j in 1..k {
            num -= phi_prev[j - 1] * r[k - j];
            denom -= phi_prev[j - 1] * r[j];
        }

        let phi_kk = if denom.abs() < 1e-12 { 0.0 } else { num / denom };

        let mut phi = Vec::with_capacity(k);
        for j in 1..k {
            phi.push(phi_prev[j - 1] - phi_kk * phi_prev[k - j - 1]);
        }
        phi.push(phi_kk);

        out.push(phi_kk);
        phi_prev = phi;
    }

    Ok(out)
}

/// ACF with Bartlett confidence bands.
///
/// The band at lag `k` is `z * sqrt((1 + 2 Σ_{j<k} r_j²) / n)`, zero at lag 0.
pub fn acf_with_band(series: &[f64], nlags: usize, level: f64) -> Result<Correlogram> {
    let values = acf(series, nlags)?;
    let z = band_quantile(level)?;
    let n = series.len() as f64;

    let mut half_widths = Vec::with_capacity(values.len());
    let mut cumulative = 0.0;
    for (k, r) in values.iter().enumerate() {
        if k == 0 {
            half_widths.push(0.0);
            continue;
        }
        half_widths.push(z * ((1.0 + 2.0 * cumulative) / n).sqrt());
        cumulative += r * r;
    }

    Ok(Correlogram {
        values,
        half_widths,
        level,
    })
}

/// PACF with the large-sample band `z / sqrt(n)`, zero at lag 0.
pub fn pacf_with_band(series: &[f64], nlags: usize, level: f64) -> Result<Correlogram> {
    let values = pacf(series, nlags)?;
    let z = band_quantile(level)?;
    let width = z / (series.len() as f64).sqrt();
    let half_widths = (0..values.len())
        .map(|k| if k == 0 { 0.0 } else { width })
        .collect();

    Ok(Correlogram {
        values,
        half_widths,
        level,
    })
}

fn check_lags(series: &[f64], nlags: usize) -> Result<()> {
    if series.is_empty() {
        return Err(AnalysisError::EmptyData);
    }
    if nlags >= series.len() {
        return Err(AnalysisError::InvalidConfig(format!(
            "{nlags} lags requested for a series of {} observations",
            series.len()
        )));
    }
    Ok(())
}

fn band_quantile(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(AnalysisError::InvalidConfig(format!(
            "confidence level must lie in (0, 1), got {level}"
        )));
    }
    Ok(quantile_normal((1.0 + level) / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ar1(n: usize, phi: f64) -> Vec<f64> {
        let mut series = vec![0.0; n];
        for i in 1..n {
            let shock = if (i * 7) % 3 == 0 { 1.0 } else { -0.5 };
            series[i] = phi * series[i - 1] + shock;
        }
        series
    }

    #[test]
    fn autocorrelation_lag_0() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(autocorrelation(&series, 0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn autocorrelation_alternating() {
        let series: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let acf1 = autocorrelation(&series, 1);
        assert!(acf1 < -0.5, "Expected negative ACF(1) for alternating, got {}", acf1);
    }

    #[test]
    fn autocorrelation_constant() {
        let series = vec![5.0; 10];
        assert_relative_eq!(autocorrelation(&series, 1), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn acf_known_values() {
        // deviations [-2, -1, 0, 1, 2], sum of squares 10
        // lag 1 products sum to 4, lag 2 products sum to -1
        let values = acf(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
        assert_eq!(values.len(), 3);
        assert_relative_eq!(values[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(values[1], 0.4, epsilon = 1e-12);
        assert_relative_eq!(values[2], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn acf_rejects_too_many_lags() {
        assert!(acf(&[1.0, 2.0, 3.0], 3).is_err());
        assert!(matches!(acf(&[], 1), Err(AnalysisError::EmptyData)));
    }

    #[test]
    fn pacf_first_lag_equals_acf() {
        let series = ar1(200, 0.6);
        let a = acf(&series, 5).unwrap();
        let p = pacf(&series, 5).unwrap();
        assert_relative_eq!(p[0], 1.0);
        assert_relative_eq!(p[1], a[1], epsilon = 1e-12);
    }

    #[test]
    fn pacf_second_lag_closed_form() {
        let series = ar1(200, 0.6);
        let a = acf(&series, 2).unwrap();
        let p = pacf(&series, 2).unwrap();
        let expected = (a[2] - a[1] * a[1]) / (1.0 - a[1] * a[1]);
        assert_relative_eq!(p[2], expected, epsilon = 1e-12);
    }

    #[test]
    fn bartlett_band_grows_with_lag() {
        let series = ar1(100, 0.8);
        let correlogram = acf_with_band(&series, 10, 0.95).unwrap();

        assert_eq!(correlogram.half_widths[0], 0.0);
        assert_relative_eq!(
            correlogram.half_widths[1],
            quantile_normal(0.975) / 10.0,
            epsilon = 1e-12
        );
        for k in 2..=10 {
            assert!(correlogram.half_widths[k] >= correlogram.half_widths[k - 1]);
        }
        assert!(correlogram.significant_lags().contains(&1));
    }

    #[test]
    fn pacf_band_is_flat() {
        let series = ar1(100, 0.8);
        let correlogram = pacf_with_band(&series, 5, 0.95).unwrap();
        assert_eq!(correlogram.max_lag(), 5);
        assert_relative_eq!(correlogram.half_widths[1], correlogram.half_widths[5]);
    }

    #[test]
    fn band_rejects_bad_level() {
        assert!(acf_with_band(&[1.0, 2.0, 3.0], 1, 1.5).is_err());
    }
}
