//! Pipeline orchestration
//!
//! This module provides the public API for BetterRest.
//! It runs a request through the full pipeline: sleep request → prediction
//! engine → bedtime calculator → formatted bedtime or a generic failure.

use crate::bedtime::BedtimeCalculator;
use crate::error::ComputeError;
use crate::model::PredictionEngine;
use crate::state::CalculationState;
use crate::types::{BedtimeResult, SleepRequest};
use std::path::Path;
use tracing::debug;

/// Calculate the bedtime for a request using the bundled sleep model.
///
/// # Arguments
/// * `request` - Wake time, desired sleep and coffee intake
///
/// # Returns
/// The bedtime formatted as `HH:MM`, or `ComputeError::CalculationFailed`
///
/// # Example
/// ```ignore
/// let request = SleepRequest::new("07:00".parse()?, 8.0, 1);
/// let bedtime = calculate(&request)?;
/// println!("{}", bedtime.formatted);
/// ```
pub fn calculate(request: &SleepRequest) -> BedtimeResult {
    calculate_with(PredictionEngine::shared(), request)
}

/// Calculate the bedtime for a request with a specific engine.
///
/// Pipeline stages:
/// 1. PredictionEngine - Evaluate the sleep model
/// 2. BedtimeCalculator - Subtract the prediction from the wake time and format
pub fn calculate_with(engine: &PredictionEngine, request: &SleepRequest) -> BedtimeResult {
    debug!(
        wake_time = %request.wake_time,
        desired_sleep_hours = request.desired_sleep_hours,
        coffee_cups = request.coffee_cups,
        "calculating bedtime"
    );

    // Stage 1: Predict the sleep actually needed
    let prediction = engine.predict_request(request);

    // Stage 2: Derive and format the bedtime
    BedtimeCalculator::calculate(request.wake_time, prediction)
}

/// Calculate the bedtime for a JSON-encoded request and return the JSON
/// encoding of the resulting state.
pub fn calculate_json(
    engine: &PredictionEngine,
    request_json: &str,
) -> Result<String, ComputeError> {
    let request: SleepRequest = serde_json::from_str(request_json)?;
    let state = CalculationState::from_result(&calculate_with(engine, &request));
    serde_json::to_string(&state).map_err(ComputeError::JsonError)
}

/// Stateful processor that remembers the outcome of the last request.
///
/// Use this when a front end needs the `Idle/Computed/Failed` state and the
/// alert that goes with it.
#[derive(Debug, Clone)]
pub struct BedtimeProcessor {
    engine: PredictionEngine,
    state: CalculationState,
}

impl Default for BedtimeProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl BedtimeProcessor {
    /// Create a processor over the bundled sleep model
    pub fn new() -> Self {
        Self::with_engine(PredictionEngine::shared().clone())
    }

    /// Create a processor over a specific engine
    pub fn with_engine(engine: PredictionEngine) -> Self {
        Self {
            engine,
            state: CalculationState::Idle,
        }
    }

    /// Create a processor over a coefficient asset on disk
    pub fn from_model_file<P: AsRef<Path>>(path: P) -> Result<Self, ComputeError> {
        Ok(Self::with_engine(PredictionEngine::from_file(path)?))
    }

    /// Run one calculation and move to `Computed` or `Failed`
    pub fn calculate(&mut self, request: &SleepRequest) -> &CalculationState {
        let result = calculate_with(&self.engine, request);
        self.state = CalculationState::from_result(&result);
        &self.state
    }

    /// Outcome of the last request, `Idle` if there was none
    pub fn state(&self) -> &CalculationState {
        &self.state
    }

    pub fn engine(&self) -> &PredictionEngine {
        &self.engine
    }
}
