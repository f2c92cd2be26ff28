//! Sleep model
//!
//! This module loads the trained coefficient set and evaluates the linear
//! sleep model:
//!
//! `predicted_hours = intercept + w_wake * wake_seconds + w_sleep * desired_hours + w_coffee * cups`
//!
//! Coefficients are data. They come from a versioned JSON asset (a default is
//! bundled with the crate) and are read-only once loaded.

use crate::error::ComputeError;
use crate::types::{Prediction, PredictionResult, SleepRequest};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info};

/// Model name every coefficient asset must declare
pub const MODEL_NAME: &str = "sleep_calculator";

/// Coefficient asset shipped with the crate
pub const BUNDLED_MODEL: &str = include_str!("../assets/sleep_calculator.json");

/// Per-input regression weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    /// Weight of the wake time (per second since midnight)
    pub wake: f64,
    /// Weight of the desired sleep amount (per hour)
    pub estimated_sleep: f64,
    /// Weight of the coffee intake (per cup)
    pub coffee: f64,
}

/// Trained coefficient set, as stored in the model asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSet {
    pub model: String,
    pub version: String,
    pub intercept: f64,
    pub weights: ModelWeights,
}

impl CoefficientSet {
    /// Build an in-memory coefficient set (used for injected models)
    pub fn new(version: impl Into<String>, intercept: f64, weights: ModelWeights) -> Self {
        Self {
            model: MODEL_NAME.to_string(),
            version: version.into(),
            intercept,
            weights,
        }
    }

    /// Parse and check a coefficient asset
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let coefficients: CoefficientSet = serde_json::from_str(json)
            .map_err(|e| ComputeError::ModelUnavailable(format!("corrupt model asset: {e}")))?;
        coefficients.check()?;
        Ok(coefficients)
    }

    /// Read and parse a coefficient asset from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ComputeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ComputeError::ModelUnavailable(format!(
                "cannot read model asset {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    /// The coefficient set bundled with the crate
    pub fn bundled() -> Result<Self, ComputeError> {
        Self::from_json(BUNDLED_MODEL)
    }

    /// Serialize the coefficient set back to its asset form
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(ComputeError::JsonError)
    }

    fn check(&self) -> Result<(), ComputeError> {
        if self.model != MODEL_NAME {
            return Err(ComputeError::ModelUnavailable(format!(
                "unexpected model '{}', expected '{MODEL_NAME}'",
                self.model
            )));
        }

        let values = [
            ("intercept", self.intercept),
            ("weights.wake", self.weights.wake),
            ("weights.estimated_sleep", self.weights.estimated_sleep),
            ("weights.coffee", self.weights.coffee),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ComputeError::ModelUnavailable(format!(
                "coefficient {name} is not finite"
            )));
        }

        Ok(())
    }
}

/// Anything that can turn the three model inputs into a sleep estimate.
pub trait SleepModel: Send + Sync + fmt::Debug {
    /// Predict the sleep actually needed, in hours
    fn predict(
        &self,
        wake_seconds: f64,
        desired_sleep_hours: f64,
        coffee_cups: f64,
    ) -> PredictionResult;

    /// Version of the underlying coefficient set
    fn version(&self) -> &str;

    /// Whether predictions can succeed at all
    fn is_available(&self) -> bool {
        true
    }
}

/// Linear regression over wake time, desired sleep and coffee intake
#[derive(Debug, Clone)]
pub struct LinearSleepModel {
    coefficients: CoefficientSet,
}

impl LinearSleepModel {
    pub fn new(coefficients: CoefficientSet) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &CoefficientSet {
        &self.coefficients
    }
}

impl SleepModel for LinearSleepModel {
    fn predict(
        &self,
        wake_seconds: f64,
        desired_sleep_hours: f64,
        coffee_cups: f64,
    ) -> PredictionResult {
        let inputs = [
            ("wake", wake_seconds),
            ("estimated_sleep", desired_sleep_hours),
            ("coffee", coffee_cups),
        ];
        if let Some((name, value)) = inputs.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ComputeError::InvalidInput(format!(
                "model input {name} is not finite: {value}"
            )));
        }

        let c = &self.coefficients;
        let predicted = c.intercept
            + c.weights.wake * wake_seconds
            + c.weights.estimated_sleep * desired_sleep_hours
            + c.weights.coffee * coffee_cups;

        debug!(
            wake_seconds,
            desired_sleep_hours,
            coffee_cups,
            predicted,
            version = %c.version,
            "evaluated sleep model"
        );

        if !predicted.is_finite() || predicted <= 0.0 {
            return Err(ComputeError::PredictionOutOfRange(predicted));
        }

        Ok(Prediction {
            predicted_sleep_hours: predicted,
            model_version: c.version.clone(),
        })
    }

    fn version(&self) -> &str {
        &self.coefficients.version
    }
}

/// Stand-in for a model whose asset failed to load.
///
/// Every prediction fails with [`ComputeError::ModelUnavailable`].
#[derive(Debug, Clone)]
pub struct UnavailableModel {
    reason: String,
}

impl UnavailableModel {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SleepModel for UnavailableModel {
    fn predict(&self, _: f64, _: f64, _: f64) -> PredictionResult {
        Err(ComputeError::ModelUnavailable(self.reason.clone()))
    }

    fn version(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Read-only prediction engine, cheap to clone and share across threads.
#[derive(Debug, Clone)]
pub struct PredictionEngine {
    model: Arc<dyn SleepModel>,
}

impl PredictionEngine {
    /// Create an engine from an already loaded coefficient set
    pub fn new(coefficients: CoefficientSet) -> Self {
        Self::with_model(LinearSleepModel::new(coefficients))
    }

    /// Create an engine around any model implementation
    pub fn with_model<M: SleepModel + 'static>(model: M) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    /// Load the engine from a JSON coefficient asset
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let coefficients = CoefficientSet::from_json(json)?;
        info!(version = %coefficients.version, "loaded sleep model");
        Ok(Self::new(coefficients))
    }

    /// Load the engine from a coefficient asset on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ComputeError> {
        let coefficients = CoefficientSet::from_file(path.as_ref())?;
        info!(
            version = %coefficients.version,
            path = %path.as_ref().display(),
            "loaded sleep model"
        );
        Ok(Self::new(coefficients))
    }

    /// Load the engine from the bundled coefficient asset
    pub fn bundled() -> Result<Self, ComputeError> {
        Self::from_json(BUNDLED_MODEL)
    }

    /// An engine that reports `ModelUnavailable` for every request
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::with_model(UnavailableModel::new(reason))
    }

    /// Process-wide engine over the bundled asset, loaded on first use
    pub fn shared() -> &'static PredictionEngine {
        static SHARED: OnceLock<PredictionEngine> = OnceLock::new();
        SHARED.get_or_init(|| {
            PredictionEngine::bundled().unwrap_or_else(|e| {
                error!(error = %e, "bundled sleep model failed to load");
                PredictionEngine::unavailable(e.to_string())
            })
        })
    }

    /// Evaluate the model on raw inputs
    pub fn predict(
        &self,
        wake_seconds: f64,
        desired_sleep_hours: f64,
        coffee_cups: f64,
    ) -> PredictionResult {
        self.model
            .predict(wake_seconds, desired_sleep_hours, coffee_cups)
    }

    /// Evaluate the model for a request
    pub fn predict_request(&self, request: &SleepRequest) -> PredictionResult {
        self.predict(
            request.wake_time.seconds() as f64,
            request.desired_sleep_hours,
            request.coffee_cups as f64,
        )
    }

    pub fn version(&self) -> &str {
        self.model.version()
    }

    pub fn is_available(&self) -> bool {
        self.model.is_available()
    }
}
