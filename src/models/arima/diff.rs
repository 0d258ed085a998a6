//! Differencing and level reconstruction.

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series, `d` elements shorter than the input.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    if d == 0 || series.is_empty() {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Coefficients `c_k` (k = 1..=d) with `x_t = Δ^d x_t + Σ c_k x_{t-k}`.
///
/// `c_k = (-1)^(k+1) * C(d, k)`; for `d = 1` this is `[1]`, for `d = 2`
/// it is `[2, -1]`.
pub fn undifference_coefficients(d: usize) -> Vec<f64> {
    let mut coefficients = Vec::with_capacity(d);
    let mut binom = 1.0;
    for k in 1..=d {
        binom = binom * (d + 1 - k) as f64 / k as f64;
        let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
        coefficients.push(sign * binom);
    }
    coefficients
}

/// Coefficients of the lag polynomial `(1 - B)^d`, constant term first.
pub fn difference_polynomial(d: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for c in undifference_coefficients(d) {
        poly.push(-c);
    }
    poly
}

/// Turn a sequence of price changes back into price levels.
///
/// Element `i` of the result is `anchor + changes[0] + ... + changes[i]`, so
/// the output has the same length as `changes` and starts one step after
/// the anchor.
///
/// # Example
/// ```
/// use commodity_arima::models::arima::{difference, reconstruct_prices};
///
/// let prices = [100.0, 101.0, 99.0, 102.0];
/// let rebuilt = reconstruct_prices(&difference(&prices, 1), prices[0]);
/// assert_eq!(rebuilt, vec![101.0, 99.0, 102.0]);
/// ```
pub fn reconstruct_prices(changes: &[f64], anchor: f64) -> Vec<f64> {
    changes
        .iter()
        .scan(anchor, |level, &change| {
            *level += change;
            Some(*level)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_order_0() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(difference(&series, 0), series);
    }

    #[test]
    fn difference_order_1() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 1), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn difference_order_2() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&series, 2), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn difference_too_short() {
        assert!(difference(&[1.0], 1).is_empty());
        assert!(difference(&[1.0, 2.0], 2).is_empty());
        assert!(difference(&[], 1).is_empty());
    }

    #[test]
    fn undifference_coefficients_match_binomials() {
        assert!(undifference_coefficients(0).is_empty());
        assert_eq!(undifference_coefficients(1), vec![1.0]);
        assert_eq!(undifference_coefficients(2), vec![2.0, -1.0]);
        assert_eq!(undifference_coefficients(3), vec![3.0, -3.0, 1.0]);
    }

    #[test]
    fn undifference_inverts_second_difference() {
        let series = [1.0, 4.0, 9.0, 16.0, 25.0, 36.0];
        let w = difference(&series, 2);
        let c = undifference_coefficients(2);
        for t in 2..series.len() {
            let rebuilt = w[t - 2] + c[0] * series[t - 1] + c[1] * series[t - 2];
            assert_relative_eq!(rebuilt, series[t], epsilon = 1e-12);
        }
    }

    #[test]
    fn difference_polynomial_order_2() {
        assert_eq!(difference_polynomial(2), vec![1.0, -2.0, 1.0]);
    }

    #[test]
    fn reconstruct_prices_round_trip() {
        let prices = [100.0, 101.0, 99.0, 102.0, 103.0, 101.0, 104.0, 105.0, 103.0, 106.0];
        let changes = difference(&prices, 1);
        assert_eq!(changes, vec![1.0, -2.0, 3.0, 1.0, -2.0, 3.0, 1.0, -2.0, 3.0]);

        let rebuilt = reconstruct_prices(&changes, prices[0]);
        assert_eq!(rebuilt.as_slice(), &prices[1..]);
    }

    #[test]
    fn reconstruct_prices_empty() {
        assert!(reconstruct_prices(&[], 10.0).is_empty());
    }
}
