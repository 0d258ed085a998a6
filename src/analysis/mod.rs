//! Price change analysis built on the ARIMA estimator.

mod analyzer;

pub use analyzer::{
    AnalyzerState, ModelSummary, OutSampleForecast, PriceChangeArimaAnalyzer, PricePath,
    ResidualDiagnostics,
};
