//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Quantile function of the standard normal distribution.
///
/// # Example
/// ```
/// use commodity_arima::utils::quantile_normal;
///
/// // 95% confidence level -> z ≈ 1.96
/// let z = quantile_normal(0.975);
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn quantile_normal(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(p),
        Err(_) => f64::NAN,
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Central moment of the given order, with `n` in the denominator.
pub fn central_moment(values: &[f64], order: i32) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|x| (x - m).powi(order)).sum::<f64>() / values.len() as f64
}

/// Biased sample skewness `m3 / m2^1.5`.
pub fn skewness(values: &[f64]) -> f64 {
    let m2 = central_moment(values, 2);
    if m2 <= 0.0 || m2.is_nan() {
        return f64::NAN;
    }
    central_moment(values, 3) / m2.powf(1.5)
}

/// Biased sample kurtosis `m4 / m2^2` (Pearson definition, normal = 3).
pub fn kurtosis(values: &[f64]) -> f64 {
    let m2 = central_moment(values, 2);
    if m2 <= 0.0 || m2.is_nan() {
        return f64::NAN;
    }
    central_moment(values, 4) / (m2 * m2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quantile_normal_known_values() {
        assert_relative_eq!(quantile_normal(0.5), 0.0, epsilon = 1e-9);
        assert_relative_eq!(quantile_normal(0.975), 1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.025), -1.959964, epsilon = 1e-5);
        assert_relative_eq!(quantile_normal(0.995), 2.575829, epsilon = 1e-5);
    }

    #[test]
    fn quantile_normal_boundary_values() {
        assert_eq!(quantile_normal(0.0), f64::NEG_INFINITY);
        assert_eq!(quantile_normal(1.0), f64::INFINITY);
    }

    #[test]
    fn mean_and_variance() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
    }

    #[test]
    fn symmetric_data_has_zero_skew() {
        assert_relative_eq!(skewness(&[-2.0, -1.0, 0.0, 1.0, 2.0]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn right_tail_has_positive_skew() {
        assert!(skewness(&[1.0, 1.0, 1.0, 1.0, 10.0]) > 1.0);
    }

    #[test]
    fn kurtosis_of_two_point_distribution() {
        // Symmetric two-point distribution has kurtosis exactly 1.
        assert_relative_eq!(kurtosis(&[-1.0, 1.0, -1.0, 1.0]), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn moments_of_constant_are_nan() {
        assert!(skewness(&[3.0, 3.0, 3.0]).is_nan());
        assert!(kurtosis(&[3.0, 3.0, 3.0]).is_nan());
    }
}
