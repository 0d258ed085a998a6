//! Statistical validation tests for fitted models.
//!
//! Provides diagnostic tests for model residuals and a stationarity test
//! for the modelled series.
//!
//! # Example
//!
//! ```
//! use commodity_arima::validation::{adf_test, durbin_watson, ljung_box, normal_test};
//!
//! let residuals = vec![0.1, -0.2, 0.15, -0.1, 0.05, -0.08, 0.12, -0.15, 0.1, -0.05];
//! let lb_result = ljung_box(&residuals, Some(5), 0);
//! if lb_result.is_white_noise(0.05) {
//!     println!("Residuals pass Ljung-Box test");
//! }
//!
//! let dw_result = durbin_watson(&residuals);
//! println!("Durbin-Watson statistic: {}", dw_result.statistic);
//!
//! let normality = normal_test(&residuals);
//! println!("K² = {:.3}, p = {:.3}", normality.statistic, normality.p_value);
//!
//! let series = vec![1.0, 1.2, 0.9, 1.1, 1.0, 0.95, 1.05, 1.0, 1.1, 0.9];
//! let adf = adf_test(&series, None);
//! println!("ADF statistic: {}", adf.statistic);
//! ```

pub mod stationarity;

pub use residual_tests::{
    durbin_watson, ljung_box, normal_test, AutocorrelationType, DurbinWatsonResult,
    LjungBoxResult, NormalTestResult,
};

pub use stationarity::{adf_test, CriticalValues, StationarityResult};
