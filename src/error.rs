//! Error types for commodity price analysis.

use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Broad classification of an [`AnalysisError`].
///
/// Every error is terminal for the current run; the category only tells the
/// caller which part of the input or call sequence was at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed or missing input data.
    Data,
    /// Invalid model order or analyzer parameters.
    Config,
    /// The parameter optimizer failed to converge.
    Convergence,
    /// An operation was invoked out of sequence.
    State,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Data => "data error",
            ErrorCategory::Config => "config error",
            ErrorCategory::Convergence => "convergence error",
            ErrorCategory::State => "state error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while loading, fitting or predicting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// A required column is absent from the input table.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A row could not be parsed.
    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    /// Dates are not strictly increasing.
    #[error("dates must be strictly increasing: {current} follows {previous} at row {index}")]
    NonMonotonicDates {
        index: usize,
        previous: String,
        current: String,
    },

    /// Underlying reader failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Invalid analyzer or model parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested ARIMA order needs more observations than are available.
    #[error("order {order} needs at least {needed} observations, got {got}")]
    OrderExceedsObservations {
        order: String,
        needed: usize,
        got: usize,
    },

    /// The optimizer stopped without meeting its tolerance.
    #[error("optimizer did not converge after {iterations} iterations (objective {objective})")]
    ConvergenceFailure { iterations: usize, objective: f64 },

    /// Operation invoked in the wrong analyzer state.
    #[error("cannot {operation} while analyzer is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
}

impl AnalysisError {
    /// The category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::EmptyData
            | AnalysisError::MissingColumn(_)
            | AnalysisError::InvalidRecord { .. }
            | AnalysisError::NonMonotonicDates { .. }
            | AnalysisError::Io(_) => ErrorCategory::Data,
            AnalysisError::InvalidConfig(_) | AnalysisError::OrderExceedsObservations { .. } => {
                ErrorCategory::Config
            }
            AnalysisError::ConvergenceFailure { .. } => ErrorCategory::Convergence,
            AnalysisError::InvalidState { .. } => ErrorCategory::State,
        }
    }
}

impl From<std::io::Error> for AnalysisError {
    fn from(err: std::io::Error) -> Self {
        AnalysisError::Io(err.to_string())
    }
}

impl From<csv::Error> for AnalysisError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        match err.kind() {
            csv::ErrorKind::Io(_) => AnalysisError::Io(err.to_string()),
            _ => AnalysisError::InvalidRecord {
                line,
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_yaml::Error> for AnalysisError {
    fn from(err: serde_yaml::Error) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}
