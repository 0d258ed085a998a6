//! Core data structures: the input dataset and forecast results.

mod dataset;
mod forecast;

pub use dataset::{DailyRecord, PriceDataset, TrainTestSplit};
pub use forecast::Forecast;
