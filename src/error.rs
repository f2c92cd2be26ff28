//! Error types for BetterRest

use thiserror::Error;

/// User-facing message shown whenever a bedtime cannot be calculated
pub const CALCULATION_FAILED_MESSAGE: &str =
    "Sorry, there was a problem calculating your bedtime.";

/// Errors that can occur during computation
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Sleep model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("{}", CALCULATION_FAILED_MESSAGE)]
    CalculationFailed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Predicted sleep duration out of range: {0}")]
    PredictionOutOfRange(f64),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ComputeError {
    /// Stable machine-readable code for reports and FFI consumers
    pub fn code(&self) -> &'static str {
        match self {
            ComputeError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            ComputeError::CalculationFailed => "CALCULATION_FAILED",
            ComputeError::InvalidInput(_) => "INVALID_INPUT",
            ComputeError::PredictionOutOfRange(_) => "PREDICTION_OUT_OF_RANGE",
            ComputeError::JsonError(_) => "JSON_ERROR",
            ComputeError::ConfigError(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculation_failed_message() {
        assert_eq!(
            ComputeError::CalculationFailed.to_string(),
            "Sorry, there was a problem calculating your bedtime."
        );
    }

    #[test]
    fn test_model_unavailable_carries_reason() {
        let err = ComputeError::ModelUnavailable("missing asset".to_string());
        assert_eq!(err.to_string(), "Sleep model unavailable: missing asset");
        assert_eq!(err.code(), "MODEL_UNAVAILABLE");
    }
}
