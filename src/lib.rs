//! BetterRest - On-device bedtime estimation
//!
//! BetterRest turns a desired wake-up time, a target amount of sleep and a
//! daily coffee intake into a recommended bedtime through a deterministic
//! pipeline: sleep request → linear sleep model → bedtime arithmetic on a
//! 24-hour clock → `HH:MM`.
//!
//! ## Modules
//!
//! - **Prediction Engine** (`model`): loads the trained coefficient set and
//!   predicts the sleep actually needed
//! - **Bedtime Calculator** (`bedtime`): subtracts the prediction from the
//!   wake time with midnight wraparound and formats the result

pub mod bedtime;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod state;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use bedtime::BedtimeCalculator;
pub use config::BetterRestConfig;
pub use error::ComputeError;
pub use model::{CoefficientSet, ModelWeights, PredictionEngine, SleepModel};
pub use pipeline::{calculate, calculate_with, BedtimeProcessor};
pub use state::{Alert, CalculationState};
pub use types::{Bedtime, BedtimeResult, Prediction, PredictionResult, SleepRequest, TimeOfDay};

/// BetterRest version
pub const BETTERREST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by front ends
pub const PRODUCER_NAME: &str = "betterrest";
