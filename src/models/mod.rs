//! Time series models.

pub mod arima;

pub use arima::{Arima, ArimaOrder, FitOptions};
