//! Analyzer configuration.
//!
//! Every field has a default, so a YAML file only needs to name the values
//! it changes:
//!
//! ```yaml
//! order: { p: 2, d: 1, q: 1 }
//! use_split: true
//! horizon_days: 365
//! ```

use crate::error::{AnalysisError, Result};
use crate::models::ArimaOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use crate::models::FitOptions;

/// Settings for [`crate::analysis::PriceChangeArimaAnalyzer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// ARIMA order fitted to the change series.
    pub order: ArimaOrder,
    /// Hold out the most recent rows as a test set.
    pub use_split: bool,
    /// Share of rows kept for training when `use_split` is set.
    pub split_fraction: f64,
    /// In-sample predictions start at this share of the fit window.
    pub in_sample_start_fraction: f64,
    /// Default out-of-sample horizon in days.
    pub horizon_days: usize,
    /// Coverage of forecast intervals and correlogram bands.
    pub confidence_level: f64,
    /// Highest lag shown in the ACF/PACF diagnostic.
    pub diagnostic_lags: usize,
    /// Feed predictions back as lags for in-sample predictions.
    pub dynamic: bool,
    pub fit: FitOptions,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            order: ArimaOrder::default(),
            use_split: false,
            split_fraction: 0.67,
            in_sample_start_fraction: 0.25,
            horizon_days: 7000,
            confidence_level: 0.95,
            diagnostic_lags: 28,
            dynamic: true,
            fit: FitOptions::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load a configuration from a YAML file. Missing fields take defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: AnalyzerConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if !(self.split_fraction > 0.0 && self.split_fraction < 1.0) {
            return Err(invalid(format!(
                "split_fraction must lie in (0, 1), got {}",
                self.split_fraction
            )));
        }
        if !(self.in_sample_start_fraction >= 0.0 && self.in_sample_start_fraction < 1.0) {
            return Err(invalid(format!(
                "in_sample_start_fraction must lie in [0, 1), got {}",
                self.in_sample_start_fraction
            )));
        }
        if self.horizon_days == 0 {
            return Err(invalid("horizon_days must be at least 1".to_string()));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(invalid(format!(
                "confidence_level must lie in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.diagnostic_lags == 0 {
            return Err(invalid("diagnostic_lags must be at least 1".to_string()));
        }
        if self.fit.max_iter == 0 {
            return Err(invalid("fit.max_iter must be at least 1".to_string()));
        }
        if !(self.fit.tolerance > 0.0 && self.fit.tolerance.is_finite()) {
            return Err(invalid(format!(
                "fit.tolerance must be positive, got {}",
                self.fit.tolerance
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> AnalysisError {
    AnalysisError::InvalidConfig(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.order, ArimaOrder::new(1, 0, 1));
        assert_eq!(config.horizon_days, 7000);
        assert_eq!(config.diagnostic_lags, 28);
        assert!(config.dynamic);
        assert!(!config.use_split);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases = [
            AnalyzerConfig { split_fraction: 0.0, ..Default::default() },
            AnalyzerConfig { split_fraction: 1.0, ..Default::default() },
            AnalyzerConfig { in_sample_start_fraction: 1.0, ..Default::default() },
            AnalyzerConfig { horizon_days: 0, ..Default::default() },
            AnalyzerConfig { confidence_level: 1.0, ..Default::default() },
            AnalyzerConfig { diagnostic_lags: 0, ..Default::default() },
            AnalyzerConfig {
                fit: FitOptions { max_iter: 0, tolerance: 1e-8 },
                ..Default::default()
            },
            AnalyzerConfig {
                fit: FitOptions { max_iter: 10, tolerance: 0.0 },
                ..Default::default()
            },
        ];
        for config in cases {
            let err = config.validate().unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Config, "{config:?}");
        }
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = AnalyzerConfig::from_yaml_str(
            "order: { p: 2, d: 1, q: 0 }\nuse_split: true\nfit:\n  max_iter: 200\n",
        )
        .unwrap();
        assert_eq!(config.order, ArimaOrder::new(2, 1, 0));
        assert!(config.use_split);
        assert_eq!(config.split_fraction, 0.67);
        assert_eq!(config.fit.max_iter, 200);
        assert_eq!(config.fit.tolerance, FitOptions::default().tolerance);
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = AnalyzerConfig::from_yaml_str("split_fraction: [1, 2]").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Config);

        let err = AnalyzerConfig::from_yaml_str("split_fraction: 1.5").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "horizon_days: 30\nconfidence_level: 0.8").unwrap();

        let config = AnalyzerConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.horizon_days, 30);
        assert_eq!(config.confidence_level, 0.8);
    }

    #[test]
    fn missing_file_is_data_error() {
        let err = AnalyzerConfig::from_yaml_file("/nonexistent/config.yaml").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Data);
    }
}
