//! Configuration file support.
//!
//! Front ends may read a `betterrest.toml` that points at a model asset and
//! sets the values a fresh form starts with:
//!
//! ```toml
//! [model]
//! path = "models/sleep_calculator.json"
//!
//! [defaults]
//! wake_time = "07:00"
//! sleep_hours = 8.0
//! coffee_cups = 0
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section is optional. A relative model path is resolved against the
//! directory holding the config file.

use crate::error::ComputeError;
use crate::model::PredictionEngine;
use crate::types::{SleepRequest, TimeOfDay, DEFAULT_SLEEP_HOURS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up when no config path is given
pub const DEFAULT_CONFIG_FILE: &str = "betterrest.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetterRestConfig {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where to load the coefficient set from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    /// Coefficient asset path; the bundled asset is used when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Starting values for a new request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefaults {
    #[serde(default = "default_wake_time")]
    pub wake_time: String,
    #[serde(default = "default_sleep_hours")]
    pub sleep_hours: f64,
    #[serde(default)]
    pub coffee_cups: u32,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `betterrest=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_wake_time() -> String {
    "07:00".to_string()
}

fn default_sleep_hours() -> f64 {
    DEFAULT_SLEEP_HOURS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            wake_time: default_wake_time(),
            sleep_hours: default_sleep_hours(),
            coffee_cups: 0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl BetterRestConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ComputeError> {
        toml::from_str(content)
            .map_err(|e| ComputeError::ConfigError(format!("Failed to parse config file: {e}")))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(BetterRestConfig)` if successful
    /// * `Err(ComputeError::ConfigError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ComputeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ComputeError::ConfigError(format!("Failed to read config file: {e}")))?;

        let mut config = Self::from_toml(&content)?;

        let resolved = match (config.model.path.as_ref(), path.parent()) {
            (Some(model_path), Some(dir)) if model_path.is_relative() => Some(dir.join(model_path)),
            _ => None,
        };
        if resolved.is_some() {
            config.model.path = resolved;
        }

        Ok(config)
    }

    /// Load `path` if given, otherwise `betterrest.toml` from the current
    /// directory if present, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ComputeError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Build the prediction engine this configuration points at
    pub fn load_engine(&self) -> Result<PredictionEngine, ComputeError> {
        match &self.model.path {
            Some(path) => PredictionEngine::from_file(path),
            None => PredictionEngine::bundled(),
        }
    }

    /// Request pre-filled with the configured defaults, held inside the
    /// ranges the form controls allow
    pub fn default_request(&self) -> Result<SleepRequest, ComputeError> {
        let wake_time: TimeOfDay = self.defaults.wake_time.parse()?;
        Ok(SleepRequest::clamped(
            wake_time,
            self.defaults.sleep_hours,
            self.defaults.coffee_cups,
        ))
    }
}
