//! # commodity-arima
//!
//! ARIMA analysis of daily commodity price changes.
//!
//! Loads a table of daily changes and inflation-adjusted prices, fits an
//! ARIMA(p,d,q) model to the changes, and turns in-sample predictions and
//! out-of-sample forecasts back into price levels. Diagnostics (ACF/PACF,
//! stationarity, residual normality) are returned as chart descriptions
//! for a separate renderer.

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod chart;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod render;
pub mod utils;
pub mod validation;

pub use error::{AnalysisError, ErrorCategory, Result};

pub mod prelude {
    pub use crate::analysis::{
        AnalyzerState, OutSampleForecast, PriceChangeArimaAnalyzer, PricePath,
        ResidualDiagnostics,
    };
    pub use crate::chart::Chart;
    pub use crate::config::{AnalyzerConfig, FitOptions};
    pub use crate::core::{DailyRecord, Forecast, PriceDataset, TrainTestSplit};
    pub use crate::error::{AnalysisError, ErrorCategory, Result};
    pub use crate::models::{Arima, ArimaOrder};
    pub use crate::render::{ChartRenderer, JsonRenderer, TextRenderer};
}
