//! ARIMA (Autoregressive Integrated Moving Average) model.

use crate::core::Forecast;
use crate::error::{AnalysisError, Result};
use crate::models::arima::diff::{difference, difference_polynomial, undifference_coefficients};
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// ARIMA model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Total number of estimated parameters.
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1 // AR + MA + intercept
    }

    /// Smallest series length this order can be estimated on.
    ///
    /// After differencing, the conditional sum of squares runs over
    /// `n - d - p` terms, which must exceed the parameter count.
    pub fn min_observations(&self) -> usize {
        let lag_bound = self.d + self.p.max(self.q) + 2;
        let param_bound = self.d + self.p + self.num_params() + 1;
        lag_bound.max(param_bound)
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 0, 1)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)
    }
}

/// Optimizer settings for [`Arima::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Nelder-Mead iteration cap.
    pub max_iter: usize,
    /// Relative convergence tolerance on the sum of squares.
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iter: 5000,
            tolerance: 1e-10,
        }
    }
}

/// A fitted ARIMA(p, d, q) model.
///
/// Parameters are estimated by minimising the conditional sum of squares of
/// the `d`-times differenced series:
///
/// `w_t = μ + Σ φ_i (w_{t-i} - μ) + Σ θ_j e_{t-j} + e_t`
///
/// with presample deviations and innovations taken as zero. The value is
/// produced once by [`Arima::fit`] and is immutable afterwards.
#[derive(Debug, Clone)]
pub struct Arima {
    order: ArimaOrder,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    intercept: f64,
    /// Input series the model was fitted on.
    series: Vec<f64>,
    /// `series` differenced `d` times.
    differenced: Vec<f64>,
    /// One-step innovations on the differenced scale, one per element.
    innovations: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    iterations: usize,
}

impl Arima {
    /// Estimate an ARIMA model of the given order on `series`.
    ///
    /// # Errors
    /// * [`AnalysisError::OrderExceedsObservations`] if the series is too short
    ///   for the order.
    /// * [`AnalysisError::ConvergenceFailure`] if the optimizer stops before
    ///   meeting its tolerance.
    pub fn fit(series: &[f64], order: ArimaOrder, options: &FitOptions) -> Result<Self> {
        let needed = order.min_observations();
        if series.len() < needed {
            return Err(AnalysisError::OrderExceedsObservations {
                order: order.to_string(),
                needed,
                got: series.len(),
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidConfig(
                "series contains non-finite values".to_string(),
            ));
        }

        let differenced = difference(series, order.d);
        let (intercept, ar, ma, iterations) = Self::estimate_parameters(&differenced, order, options)?;

        let innovations = Self::innovations(&differenced, order, intercept, &ar, &ma);
        let effective = &innovations[order.p..];
        let n_eff = effective.len() as f64;
        let sigma2 = effective.iter().map(|e| e * e).sum::<f64>() / n_eff;

        let k = order.num_params() as f64;
        let log_likelihood =
            -0.5 * n_eff * (1.0 + sigma2.ln() + (2.0 * std::f64::consts::PI).ln());
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n_eff.ln();

        info!(
            order = %order,
            observations = series.len(),
            iterations,
            sigma2,
            aic,
            "fitted ARIMA model"
        );

        Ok(Self {
            order,
            ar_coefficients: ar,
            ma_coefficients: ma,
            intercept,
            series: series.to_vec(),
            differenced,
            innovations,
            sigma2,
            log_likelihood,
            aic,
            bic,
            iterations,
        })
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Mean of the differenced series.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Optimizer iterations used during fitting.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of observations the model was fitted on.
    pub fn nobs(&self) -> usize {
        self.series.len()
    }

    /// Residuals that entered the sum of squares.
    ///
    /// Element `i` belongs to input index `d + p + i`.
    pub fn residuals(&self) -> &[f64] {
        &self.innovations[self.order.p..]
    }

    /// Input index of the first residual.
    pub fn residual_offset(&self) -> usize {
        self.order.d + self.order.p
    }

    /// One-step-ahead fitted values on the input scale for indices `d..n`.
    ///
    /// Each value is the observation minus its one-step innovation.
    pub fn fitted_values(&self) -> Vec<f64> {
        self.series[self.order.d..]
            .iter()
            .zip(&self.innovations)
            .map(|(x, e)| x - e)
            .collect()
    }

    /// Predictions for input indices `[start, end)`.
    ///
    /// With `dynamic = false` each value is a one-step-ahead prediction from
    /// observed history. With `dynamic = true` predictions from `start`
    /// onward replace observations as lagged inputs and their innovations
    /// are zero. Indices at or beyond the sample length continue as
    /// forecasts either way.
    pub fn predict(&self, start: usize, end: usize, dynamic: bool) -> Result<Vec<f64>> {
        let n = self.series.len();
        let d = self.order.d;
        if start < d {
            return Err(AnalysisError::InvalidConfig(format!(
                "prediction start {start} precedes the first differenced observation {d}"
            )));
        }
        if start > end {
            return Err(AnalysisError::InvalidConfig(format!(
                "prediction start {start} is after end {end}"
            )));
        }
        if start > n {
            return Err(AnalysisError::InvalidConfig(format!(
                "prediction start {start} is beyond the sample of {n} observations"
            )));
        }

        let undiff = undifference_coefficients(d);
        let m = self.differenced.len();
        let mut levels = self.series.clone();
        let mut w = self.differenced.clone();
        let mut e = self.innovations.clone();
        let mut out = Vec::with_capacity(end - start);

        for t in start..end {
            let tw = t - d;
            let pred_w = self.one_step(&w, &e, tw);

            let mut pred = pred_w;
            for (k, c) in undiff.iter().enumerate() {
                pred += c * levels[t - 1 - k];
            }
            out.push(pred);

            if tw >= m {
                w.push(pred_w);
                e.push(0.0);
                levels.push(pred);
            } else if dynamic {
                w[tw] = pred_w;
                e[tw] = 0.0;
                levels[t] = pred;
            }
        }

        debug!(start, end, dynamic, "computed ARIMA predictions");
        Ok(out)
    }

    /// Forecast `steps` values past the end of the sample.
    ///
    /// Interval half-widths are `z * sqrt(sigma2 * Σ_{j<h} ψ_j²)`, with ψ
    /// the moving-average weights of the integrated model and `z` the
    /// normal quantile for `level`.
    pub fn forecast(&self, steps: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "confidence level must lie in (0, 1), got {level}"
            )));
        }
        if steps == 0 {
            return Ok(Forecast::new());
        }

        let n = self.series.len();
        let point = self.predict(n, n + steps, false)?;
        let psi = self.psi_weights(steps);
        let z = quantile_normal((1.0 + level) / 2.0);

        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        let mut cumulative = 0.0;
        for (h, value) in point.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let se = (self.sigma2 * cumulative).sqrt();
            lower.push(value - z * se);
            upper.push(value + z * se);
        }

        info!(steps, level, "forecast beyond sample");
        Forecast::from_values_with_intervals(point, lower, upper)
    }

    /// First `count` MA(∞) weights of `φ(B)(1-B)^d x_t = θ(B) e_t`.
    pub fn psi_weights(&self, count: usize) -> Vec<f64> {
        // φ*(B) = φ(B)(1-B)^d, stored as 1 - Σ φ*_i B^i
        let mut phi_poly = vec![1.0];
        phi_poly.extend(self.ar_coefficients.iter().map(|c| -c));
        let diff_poly = difference_polynomial(self.order.d);
        let mut product = vec![0.0; phi_poly.len() + diff_poly.len() - 1];
        for (i, a) in phi_poly.iter().enumerate() {
            for (j, b) in diff_poly.iter().enumerate() {
                product[i + j] += a * b;
            }
        }
        let phi_star: Vec<f64> = product[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(count);
        for j in 0..count {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = self.ma_coefficients.get(j - 1).copied().unwrap_or(0.0);
            for (i, phi) in phi_star.iter().enumerate().take(j) {
                value += phi * psi[j - 1 - i];
            }
            psi.push(value);
        }
        psi
    }

    /// Prediction of `w[t]` from lags in `w` and innovations in `e`.
    fn one_step(&self, w: &[f64], e: &[f64], t: usize) -> f64 {
        let mut pred = self.intercept;
        for (i, phi) in self.ar_coefficients.iter().enumerate() {
            if t > i {
                pred += phi * (w[t - 1 - i] - self.intercept);
            }
        }
        for (j, theta) in self.ma_coefficients.iter().enumerate() {
            if t > j {
                pred += theta * e[t - 1 - j];
            }
        }
        pred
    }

    /// Innovations for every element of the differenced series.
    fn innovations(w: &[f64], order: ArimaOrder, intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
        let mut e = vec![0.0; w.len()];
        for t in 0..w.len() {
            let mut pred = intercept;
            for i in 0..order.p {
                if t > i {
                    pred += ar[i] * (w[t - 1 - i] - intercept);
                }
            }
            for j in 0..order.q {
                if t > j {
                    pred += ma[j] * e[t - 1 - j];
                }
            }
            e[t] = w[t] - pred;
        }
        e
    }

    /// Conditional sum of squares over `t >= p`.
    fn calculate_css(w: &[f64], order: ArimaOrder, intercept: f64, ar: &[f64], ma: &[f64]) -> f64 {
        Self::innovations(w, order, intercept, ar, ma)[order.p..]
            .iter()
            .map(|e| e * e)
            .sum()
    }

    /// Returns `(intercept, ar, ma, iterations)`.
    fn estimate_parameters(
        w: &[f64],
        order: ArimaOrder,
        options: &FitOptions,
    ) -> Result<(f64, Vec<f64>, Vec<f64>, usize)> {
        let p = order.p;
        let q = order.q;
        let mu = mean(w);

        if p == 0 && q == 0 {
            return Ok((mu, vec![], vec![], 0));
        }

        // Coefficients are searched as unconstrained partial autocorrelations
        // and mapped into the stationary / invertible region.
        let mut initial = vec![0.0; order.num_params()];
        initial[0] = mu;
        for i in 0..p {
            initial[1 + i] = 0.1 / (i + 1) as f64;
        }
        for i in 0..q {
            initial[1 + p + i] = 0.1 / (i + 1) as f64;
        }

        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-MAX_UNCONSTRAINED, MAX_UNCONSTRAINED)).take(p + q));

        let config = NelderMeadConfig {
            max_iter: options.max_iter,
            tolerance: options.tolerance,
            ..Default::default()
        };

        let result = nelder_mead(
            |params| {
                let (ar, ma) = constrain_coefficients(&params[1..], p);
                Self::calculate_css(w, order, params[0], &ar, &ma)
            },
            &initial,
            Some(&bounds),
            config,
        );

        if !result.converged || !result.optimal_value.is_finite() {
            warn!(
                order = %order,
                iterations = result.iterations,
                objective = result.optimal_value,
                "ARIMA optimizer did not converge"
            );
            return Err(AnalysisError::ConvergenceFailure {
                iterations: result.iterations,
                objective: result.optimal_value,
            });
        }

        let point = result.optimal_point;
        if point[1..].iter().any(|u| u.abs() >= MAX_UNCONSTRAINED) {
            warn!(
                order = %order,
                "ARIMA estimate is at the edge of the stationary/invertible region"
            );
        }
        let (ar, ma) = constrain_coefficients(&point[1..], p);
        Ok((point[0], ar, ma, result.iterations))
    }
}

/// Largest unconstrained value searched; `tanh` of it is 1 - 1.2e-5.
const MAX_UNCONSTRAINED: f64 = 6.0;

/// Map unconstrained values to AR and MA coefficients.
///
/// The first `p` values become AR coefficients and the rest MA coefficients.
/// Each block goes through `tanh` to partial autocorrelations in (-1, 1) and
/// then through the Durbin-Levinson recursion, so the AR polynomial
/// `1 - Σ φ_i B^i` is stationary and the MA polynomial `1 + Σ θ_j B^j` is
/// invertible for every input.
fn constrain_coefficients(unconstrained: &[f64], p: usize) -> (Vec<f64>, Vec<f64>) {
    let ar = stationary_polynomial(&unconstrained[..p]);
    let ma = stationary_polynomial(&unconstrained[p..])
        .into_iter()
        .map(|c| -c)
        .collect();
    (ar, ma)
}

/// Coefficients `a` of a stationary `1 - Σ a_i B^i` from unconstrained values.
fn stationary_polynomial(unconstrained: &[f64]) -> Vec<f64> {
    let mut coefficients: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for (k, u) in unconstrained.iter().enumerate() {
        let partial = u.tanh();
        let mut next: Vec<f64> = (0..k)
            .map(|j| coefficients[j] - partial * coefficients[k - 1 - j])
            .collect();
        next.push(partial);
        coefficients = next;
    }
    coefficients
}
