//! Serial correlation features used by the diagnostic charts.

pub mod autocorrelation;

pub use autocorrelation::{
    acf, acf_with_band, autocorrelation, pacf, pacf_with_band, Correlogram,
};
