//! Calculation state
//!
//! A front end moves through three states: `Idle` until the first explicit
//! request, then `Computed` or `Failed` depending on the last request.
//! Whether to show a placeholder before the user touches any control is a
//! front-end decision and is not tracked here.

use crate::error::CALCULATION_FAILED_MESSAGE;
use crate::types::{Bedtime, BedtimeResult};
use serde::{Deserialize, Serialize};

/// Text shown in place of a bedtime before anything was calculated
pub const IDLE_PLACEHOLDER: &str = "--:--";

/// Alert title for a successful calculation
pub const SUCCESS_TITLE: &str = "Your ideal bedtime is...";

/// Alert title for a failed calculation
pub const ERROR_TITLE: &str = "Error";

/// Outcome of the most recent calculation request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalculationState {
    /// No calculation requested yet
    #[default]
    Idle,
    /// Last request succeeded
    Computed { bedtime: Bedtime },
    /// Last request failed
    Failed { message: String },
}

/// Title and message a front end presents after a calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl CalculationState {
    /// State reached after a calculation finished with `result`
    pub fn from_result(result: &BedtimeResult) -> Self {
        match result {
            Ok(bedtime) => CalculationState::Computed {
                bedtime: bedtime.clone(),
            },
            // Every failure is shown with the same generic message
            Err(_) => CalculationState::Failed {
                message: CALCULATION_FAILED_MESSAGE.to_string(),
            },
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, CalculationState::Idle)
    }

    pub fn bedtime(&self) -> Option<&Bedtime> {
        match self {
            CalculationState::Computed { bedtime } => Some(bedtime),
            _ => None,
        }
    }

    /// Text for the bedtime display: the time, nothing on failure, or the
    /// placeholder while idle
    pub fn display_text(&self) -> &str {
        match self {
            CalculationState::Idle => IDLE_PLACEHOLDER,
            CalculationState::Computed { bedtime } => &bedtime.formatted,
            CalculationState::Failed { .. } => "",
        }
    }

    /// Alert to present for this state, if any
    pub fn alert(&self) -> Option<Alert> {
        match self {
            CalculationState::Idle => None,
            CalculationState::Computed { bedtime } => Some(Alert {
                title: SUCCESS_TITLE.to_string(),
                message: bedtime.formatted.clone(),
            }),
            CalculationState::Failed { message } => Some(Alert {
                title: ERROR_TITLE.to_string(),
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComputeError;
    use crate::types::TimeOfDay;
    use pretty_assertions::assert_eq;

    fn bedtime() -> Bedtime {
        Bedtime {
            time: TimeOfDay::from_hm(23, 0).unwrap(),
            formatted: "23:00".to_string(),
            predicted_sleep_hours: 8.0,
        }
    }

    #[test]
    fn test_idle_by_default() {
        let state = CalculationState::default();
        assert!(state.is_idle());
        assert_eq!(state.display_text(), "--:--");
        assert_eq!(state.alert(), None);
    }

    #[test]
    fn test_computed_alert() {
        let state = CalculationState::from_result(&Ok(bedtime()));
        assert_eq!(state.display_text(), "23:00");
        assert_eq!(
            state.alert(),
            Some(Alert {
                title: "Your ideal bedtime is...".to_string(),
                message: "23:00".to_string(),
            })
        );
    }

    #[test]
    fn test_failed_alert() {
        let state = CalculationState::from_result(&Err(ComputeError::CalculationFailed));
        assert_eq!(state.bedtime(), None);
        assert_eq!(state.display_text(), "");
        assert_eq!(
            state.alert(),
            Some(Alert {
                title: "Error".to_string(),
                message: "Sorry, there was a problem calculating your bedtime.".to_string(),
            })
        );
    }

    #[test]
    fn test_state_json_is_tagged() {
        let state = CalculationState::from_result(&Ok(bedtime()));
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "computed");
        assert_eq!(json["bedtime"]["formatted"], "23:00");
    }
}
