//! ARIMA (Autoregressive Integrated Moving Average) modelling.
//!
//! This module provides:
//! - [`Arima`], estimated by conditional sum of squares
//! - differencing helpers and price level reconstruction

mod diff;
mod model;

pub use diff::{difference, difference_polynomial, reconstruct_prices, undifference_coefficients};
pub use model::{Arima, ArimaOrder, FitOptions};
