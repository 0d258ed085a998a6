//! Ordinary least squares on a dense design matrix.
//!
//! Used by the augmented Dickey-Fuller regression, where the coefficient
//! standard errors are needed as well as the estimates.

use crate::error::{AnalysisError, Result};

/// OLS estimates with their standard errors.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// One coefficient per design matrix column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Number of observations.
    pub n_obs: usize,
}

impl OlsFit {
    /// t statistic of coefficient `index`.
    pub fn t_stat(&self, index: usize) -> f64 {
        match (self.coefficients.get(index), self.std_errors.get(index)) {
            (Some(&b), Some(&se)) if se > 0.0 => b / se,
            _ => f64::NAN,
        }
    }

    /// Gaussian AIC: `n ln(RSS/n) + 2k`.
    pub fn aic(&self) -> f64 {
        let n = self.n_obs as f64;
        if self.rss <= 0.0 {
            return f64::NEG_INFINITY;
        }
        n * (self.rss / n).ln() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit `y = X β + ε` where `rows[i]` is the i-th row of `X`.
///
/// The caller includes a column of ones when an intercept is wanted.
pub fn ols_fit(y: &[f64], rows: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    if rows.len() != n {
        return Err(AnalysisError::InvalidConfig(format!(
            "design matrix has {} rows for {} observations",
            rows.len(),
            n
        )));
    }
    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 || n <= k {
        return Err(AnalysisError::InvalidConfig(format!(
            "OLS needs more observations ({n}) than regressors ({k})"
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y_obs) in rows.iter().zip(y) {
        if row.len() != k {
            return Err(AnalysisError::InvalidConfig(
                "ragged design matrix".to_string(),
            ));
        }
        for i in 0..k {
            xty[i] += row[i] * y_obs;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        AnalysisError::InvalidConfig("OLS regression failed: singular design matrix".into())
    })?;
    let beta = cholesky_solve(&chol, &xty);

    let rss: f64 = rows
        .iter()
        .zip(y)
        .map(|(row, &y_obs)| {
            let fitted: f64 = row.iter().zip(&beta).map(|(x, b)| x * b).sum();
            (y_obs - fitted).powi(2)
        })
        .sum();
    let sigma_sq = rss / (n - k) as f64;

    // Diagonal of (X'X)^-1 from solving against unit vectors.
    let std_errors = (0..k)
        .map(|i| {
            let mut unit = vec![0.0; k];
            unit[i] = 1.0;
            let column = cholesky_solve(&chol, &unit);
            (sigma_sq * column[i]).max(0.0).sqrt()
        })
        .collect();

    Ok(OlsFit {
        coefficients: beta,
        std_errors,
        rss,
        n_obs: n,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if sum <= 1e-12 * a[i][i].abs().max(1.0) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L L' x = b` given the Cholesky factor `L`.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    x
}
