//! ARIMA analysis of daily commodity price changes.

use crate::chart::{Chart, Panel};
use crate::config::AnalyzerConfig;
use crate::core::{PriceDataset, TrainTestSplit};
use crate::error::{AnalysisError, Result};
use crate::features::{acf_with_band, pacf_with_band};
use crate::models::arima::reconstruct_prices;
use crate::models::Arima;
use crate::utils::stats::{mean, variance};
use crate::validation::{
    adf_test, durbin_watson, ljung_box, normal_test, DurbinWatsonResult, LjungBoxResult,
    NormalTestResult, StationarityResult,
};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Lifecycle of a [`PriceChangeArimaAnalyzer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AnalyzerState {
    /// No dataset yet.
    Unconfigured,
    /// Dataset and settings stored, model not fitted.
    Configured,
    /// Model fitted; predictions and diagnostics are available.
    Fitted,
}

impl AnalyzerState {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyzerState::Unconfigured => "unconfigured",
            AnalyzerState::Configured => "configured",
            AnalyzerState::Fitted => "fitted",
        }
    }
}

impl fmt::Display for AnalyzerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Predicted changes for a run of dates, with the implied price levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePath {
    /// Row of the fit window the first prediction belongs to.
    pub start_index: usize,
    /// Whether predictions were fed back as lags.
    pub dynamic: bool,
    pub dates: Vec<NaiveDate>,
    pub changes: Vec<f64>,
    /// Anchor price plus the running sum of `changes`.
    pub prices: Vec<f64>,
}

impl PricePath {
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Forecast beyond the fit window, in changes and in price levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutSampleForecast {
    pub dates: Vec<NaiveDate>,
    pub changes: Vec<f64>,
    pub prices: Vec<f64>,
    pub lower_prices: Vec<f64>,
    pub upper_prices: Vec<f64>,
    /// Interval coverage.
    pub level: f64,
}

impl OutSampleForecast {
    pub fn horizon(&self) -> usize {
        self.changes.len()
    }
}

/// Test statistics reported with the residual chart.
#[derive(Debug, Clone, Serialize)]
pub struct ResidualDiagnostics {
    pub residual_mean: f64,
    pub residual_std: f64,
    pub normality: NormalTestResult,
    pub ljung_box: LjungBoxResult,
    pub durbin_watson: DurbinWatsonResult,
}

/// Estimated parameters and fit statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub order: String,
    pub observations: usize,
    pub intercept: f64,
    pub ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub sigma2: f64,
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    pub iterations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Fits an ARIMA model to the "daily change" column of a price table and
/// turns its predictions back into price levels.
///
/// Calls must follow the lifecycle in [`AnalyzerState`]: `configure`, then
/// `fit`, then any of the prediction and diagnostic operations. Calling an
/// operation too early returns [`AnalysisError::InvalidState`].
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use commodity_arima::prelude::*;
///
/// let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
/// let prices = [100.0, 101.0, 99.0, 102.0, 103.0, 101.0, 104.0, 105.0, 103.0, 106.0];
/// let dataset = PriceDataset::from_prices(start, &prices).unwrap();
///
/// let config = AnalyzerConfig {
///     order: ArimaOrder::new(1, 0, 0),
///     ..Default::default()
/// };
/// let mut analyzer = PriceChangeArimaAnalyzer::new();
/// analyzer.configure(dataset, config).unwrap();
/// analyzer.fit().unwrap();
///
/// let path = analyzer.in_sample_predictions(true).unwrap();
/// assert_eq!(path.prices[0], 100.0 + path.changes[0]);
/// ```
#[derive(Debug, Default)]
pub struct PriceChangeArimaAnalyzer {
    config: AnalyzerConfig,
    dataset: Option<PriceDataset>,
    split: Option<TrainTestSplit>,
    model: Option<Arima>,
}

impl PriceChangeArimaAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AnalyzerState {
        match (&self.dataset, &self.model) {
            (None, _) => AnalyzerState::Unconfigured,
            (Some(_), None) => AnalyzerState::Configured,
            (Some(_), Some(_)) => AnalyzerState::Fitted,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn dataset(&self) -> Option<&PriceDataset> {
        self.dataset.as_ref()
    }

    /// The train/test partition, when `use_split` is set.
    pub fn split(&self) -> Option<&TrainTestSplit> {
        self.split.as_ref()
    }

    pub fn model(&self) -> Option<&Arima> {
        self.model.as_ref()
    }

    /// Rows the model is (or will be) fitted on.
    pub fn fit_window(&self) -> Option<&PriceDataset> {
        match &self.split {
            Some(split) => Some(&split.train),
            None => self.dataset.as_ref(),
        }
    }

    /// Store the dataset and settings.
    ///
    /// Validates the configuration and checks that the fit window holds
    /// enough rows for the requested order. May be called again to replace
    /// the inputs as long as no model has been fitted.
    pub fn configure(&mut self, dataset: PriceDataset, config: AnalyzerConfig) -> Result<()> {
        if self.model.is_some() {
            return Err(self.state_error("configure"));
        }
        config.validate()?;

        let split = if config.use_split {
            Some(dataset.split(config.split_fraction)?)
        } else {
            None
        };

        let window_len = split.as_ref().map_or(dataset.len(), |s| s.train_len());
        let needed = config.order.min_observations();
        if window_len < needed {
            return Err(AnalysisError::OrderExceedsObservations {
                order: config.order.to_string(),
                needed,
                got: window_len,
            });
        }

        info!(
            rows = dataset.len(),
            fit_rows = window_len,
            order = %config.order,
            use_split = config.use_split,
            "configured analyzer"
        );

        self.dataset = Some(dataset);
        self.split = split;
        self.config = config;
        Ok(())
    }

    /// Partition the dataset chronologically at the configured fraction.
    ///
    /// The oldest rows train, the most recent rows test.
    pub fn split_train_test(&self) -> Result<TrainTestSplit> {
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| self.state_error("split the dataset"))?;
        dataset.split(self.config.split_fraction)
    }

    /// Estimate the model on the fit window. Only one fit per analyzer.
    pub fn fit(&mut self) -> Result<&Arima> {
        if self.state() != AnalyzerState::Configured {
            return Err(self.state_error("fit"));
        }
        let window = self
            .fit_window()
            .ok_or_else(|| self.state_error("fit"))?;

        let model = Arima::fit(&window.changes(), self.config.order, &self.config.fit)?;
        info!(
            first = %window.first_date(),
            last = %window.last_date(),
            aic = model.aic(),
            "fitted change model"
        );
        let model: &Arima = self.model.insert(model);
        Ok(model)
    }

    pub fn summary(&self) -> Result<ModelSummary> {
        let (window, model) = self.fitted("summarise the model")?;
        Ok(ModelSummary {
            order: model.order().to_string(),
            observations: model.nobs(),
            intercept: model.intercept(),
            ar: model.ar_coefficients().to_vec(),
            ma: model.ma_coefficients().to_vec(),
            sigma2: model.sigma2(),
            log_likelihood: model.log_likelihood(),
            aic: model.aic(),
            bic: model.bic(),
            iterations: model.iterations(),
            first_date: window.first_date(),
            last_date: window.last_date(),
        })
    }

    /// ACF and PACF of the raw change series, plus an ADF test.
    ///
    /// Covers the whole dataset, not only the fit window. Lags run from 0 to
    /// `diagnostic_lags`, capped below the series length.
    pub fn diagnostic_plot(&self) -> Result<(Chart, StationarityResult)> {
        self.fitted("draw the diagnostic plot")?;
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| self.state_error("draw the diagnostic plot"))?;
        let changes = dataset.changes();

        let max_lag = self.config.diagnostic_lags.min(changes.len().saturating_sub(1));
        if max_lag < self.config.diagnostic_lags {
            warn!(
                requested = self.config.diagnostic_lags,
                used = max_lag,
                "diagnostic lags capped by series length"
            );
        }

        let level = self.config.confidence_level;
        let acf = acf_with_band(&changes, max_lag, level)?;
        let pacf = pacf_with_band(&changes, max_lag, level)?;
        let lags: Vec<usize> = (0..=max_lag).collect();

        let stationarity = adf_test(&changes, None);
        if !stationarity.is_stationary {
            warn!(
                statistic = stationarity.statistic,
                p_value = stationarity.p_value,
                "change series may not be stationary"
            );
        }
        let band_name = format!("{:.0}% band", level * 100.0);

        let chart = Chart::new("Daily change diagnostics")
            .with_panel(
                Panel::new("Autocorrelation")
                    .axes("lag", "correlation")
                    .bars("acf", &lags, &acf.values)
                    .band(band_name.as_str(), &lags, &negated(&acf.half_widths), &acf.half_widths)
                    .hline("zero", 0.0)
                    .note(format!(
                        "ADF statistic {:.4}, p-value {:.4}, lags {}",
                        stationarity.statistic, stationarity.p_value, stationarity.lags
                    )),
            )
            .with_panel(
                Panel::new("Partial autocorrelation")
                    .axes("lag", "correlation")
                    .bars("pacf", &lags, &pacf.values)
                    .band(band_name.as_str(), &lags, &negated(&pacf.half_widths), &pacf.half_widths)
                    .hline("zero", 0.0),
            );

        Ok((chart, stationarity))
    }

    /// One-step fitted changes over the fit window, as prices.
    pub fn fitted_prices(&self) -> Result<PricePath> {
        let (window, model) = self.fitted("compute fitted prices")?;
        let start = model.order().d;
        let changes = model.fitted_values();
        Ok(price_path(window, start, false, changes))
    }

    /// Predictions over `[floor(in_sample_start_fraction * n), n)` of the fit
    /// window, anchored at the window's first price.
    ///
    /// The start is raised to `d` when the model differences the changes.
    pub fn in_sample_predictions(&self, dynamic: bool) -> Result<PricePath> {
        let (window, model) = self.fitted("predict in sample")?;
        let n = window.len();
        let start = ((self.config.in_sample_start_fraction * n as f64).floor() as usize)
            .max(model.order().d)
            .min(n);

        let changes = model.predict(start, n, dynamic)?;
        info!(start, end = n, dynamic, "in-sample predictions");
        Ok(price_path(window, start, dynamic, changes))
    }

    /// Forecast `horizon_days` changes past the fit window with intervals.
    ///
    /// Prices are anchored at the last price of the fit window and dated from
    /// the following day. Lower and upper bounds are accumulated separately.
    pub fn out_sample_predictions(&self, horizon_days: usize) -> Result<OutSampleForecast> {
        let (window, model) = self.fitted("forecast out of sample")?;
        if horizon_days == 0 {
            return Err(AnalysisError::InvalidConfig(
                "horizon_days must be at least 1".to_string(),
            ));
        }

        let level = self.config.confidence_level;
        let forecast = model.forecast(horizon_days, level)?;
        let anchor = window.last_price();
        let last_date = window.last_date();

        let changes = forecast.point().to_vec();
        let prices = reconstruct_prices(&changes, anchor);
        let lower_prices = reconstruct_prices(forecast.lower().unwrap_or(&changes), anchor);
        let upper_prices = reconstruct_prices(forecast.upper().unwrap_or(&changes), anchor);
        let dates = (1..=horizon_days)
            .map(|h| last_date + Duration::days(h as i64))
            .collect();

        info!(horizon_days, level, anchor, "out-of-sample forecast");
        Ok(OutSampleForecast {
            dates,
            changes,
            prices,
            lower_prices,
            upper_prices,
            level,
        })
    }

    /// Residuals over time with normality and serial correlation tests.
    pub fn residual_plot(&self) -> Result<(Chart, ResidualDiagnostics)> {
        let (window, model) = self.fitted("draw the residual plot")?;
        let residuals = model.residuals();
        let dates = window.dates();
        let dates = &dates[model.residual_offset()..];

        let order = model.order();
        let diagnostics = ResidualDiagnostics {
            residual_mean: mean(residuals),
            residual_std: variance(residuals).sqrt(),
            normality: normal_test(residuals),
            ljung_box: ljung_box(residuals, None, order.p + order.q),
            durbin_watson: durbin_watson(residuals),
        };

        let chart = Chart::new(format!("Residuals of ARIMA{}", order)).with_panel(
            Panel::new("Residuals")
                .axes("date", "residual")
                .line("residual", dates, residuals)
                .hline("zero", 0.0)
                .note(format!(
                    "normality K² {:.4}, p-value {:.4} (skew {:.4}, kurtosis {:.4})",
                    diagnostics.normality.statistic,
                    diagnostics.normality.p_value,
                    diagnostics.normality.skewness,
                    diagnostics.normality.kurtosis
                ))
                .note(format!(
                    "Ljung-Box Q({}) {:.4}, p-value {:.4}",
                    diagnostics.ljung_box.lags,
                    diagnostics.ljung_box.statistic,
                    diagnostics.ljung_box.p_value
                ))
                .note(format!(
                    "Durbin-Watson {:.4}",
                    diagnostics.durbin_watson.statistic
                )),
        );

        Ok((chart, diagnostics))
    }

    /// Overlay in-sample predicted prices on the true prices of the fit
    /// window.
    pub fn plot_in_sample(&self, path: &PricePath) -> Result<Chart> {
        let (window, model) = self.fitted("plot in-sample predictions")?;
        let panel = actual_prices_panel("In-sample predictions", window)
            .line("predicted", &path.dates, &path.prices);
        let mode = if path.dynamic { "dynamic" } else { "static" };
        Ok(Chart::new(format!(
            "ARIMA{} in-sample ({mode})",
            model.order()
        ))
        .with_panel(panel))
    }

    /// Overlay forecast prices and their interval on the true prices of the
    /// whole dataset.
    pub fn plot_out_sample(&self, forecast: &OutSampleForecast) -> Result<Chart> {
        let (_, model) = self.fitted("plot out-of-sample predictions")?;
        let dataset = self
            .dataset
            .as_ref()
            .ok_or_else(|| self.state_error("plot out-of-sample predictions"))?;
        let panel = actual_prices_panel("Out-of-sample forecast", dataset)
            .line("forecast", &forecast.dates, &forecast.prices)
            .band(
                format!("{:.0}% interval", forecast.level * 100.0),
                &forecast.dates,
                &forecast.lower_prices,
                &forecast.upper_prices,
            );
        Ok(Chart::new(format!(
            "ARIMA{} forecast, {} days",
            model.order(),
            forecast.horizon()
        ))
        .with_panel(panel))
    }

    fn fitted(&self, operation: &'static str) -> Result<(&PriceDataset, &Arima)> {
        match (self.fit_window(), self.model.as_ref()) {
            (Some(window), Some(model)) => Ok((window, model)),
            _ => Err(self.state_error(operation)),
        }
    }

    fn state_error(&self, operation: &'static str) -> AnalysisError {
        AnalysisError::InvalidState {
            operation,
            state: self.state().name(),
        }
    }
}

fn actual_prices_panel(title: &str, prices: &PriceDataset) -> Panel {
    Panel::new(title)
        .axes("date", "price")
        .line("actual", &prices.dates(), &prices.prices())
}

fn negated(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| -v).collect()
}

fn price_path(window: &PriceDataset, start: usize, dynamic: bool, changes: Vec<f64>) -> PricePath {
    let dates = window.dates()[start..start + changes.len()].to_vec();
    let prices = reconstruct_prices(&changes, window.first_price());
    PricePath {
        start_index: start,
        dynamic,
        dates,
        changes,
        prices,
    }
}
