//! Core types for BetterRest
//!
//! This module defines the values that flow through a single calculation:
//! the wall-clock time of day, the request built from user inputs, the
//! prediction produced by the sleep model and the resulting bedtime.

use crate::error::ComputeError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds in one wall-clock day
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Seconds in one hour
pub const SECONDS_PER_HOUR: u32 = 3_600;

/// Lowest desired sleep amount offered to the user (hours)
pub const MIN_SLEEP_HOURS: f64 = 4.0;

/// Highest desired sleep amount offered to the user (hours)
pub const MAX_SLEEP_HOURS: f64 = 12.0;

/// Step of the desired sleep stepper (hours)
pub const SLEEP_HOURS_STEP: f64 = 0.25;

/// Highest daily coffee intake offered to the user (cups)
pub const MAX_COFFEE_CUPS: u8 = 20;

/// Desired sleep amount before the user touches the stepper (hours)
pub const DEFAULT_SLEEP_HOURS: f64 = 8.0;

/// Wake time before the user touches the picker (07:00)
pub const DEFAULT_WAKE_TIME: TimeOfDay = TimeOfDay(7 * SECONDS_PER_HOUR);

/// Wall-clock time of day, stored as seconds since midnight.
///
/// The value is always in `[0, 86400)`. There is no date or timezone
/// component; arithmetic that crosses midnight wraps onto the same clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// 00:00
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Build from a signed second count, wrapping onto the 24-hour clock
    pub fn from_seconds(seconds: i64) -> Self {
        TimeOfDay(seconds.rem_euclid(SECONDS_PER_DAY as i64) as u32)
    }

    /// Build from clock components, rejecting out-of-range values
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, ComputeError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ComputeError::InvalidInput(format!(
                "time of day out of range: {hour:02}:{minute:02}:{second:02}"
            )));
        }
        Ok(TimeOfDay(hour * SECONDS_PER_HOUR + minute * 60 + second))
    }

    /// Build from hour and minute
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ComputeError> {
        Self::from_hms(hour, minute, 0)
    }

    /// Seconds since midnight
    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / SECONDS_PER_HOUR
    }

    pub fn minute(&self) -> u32 {
        (self.0 % SECONDS_PER_HOUR) / 60
    }

    pub fn second(&self) -> u32 {
        self.0 % 60
    }
}

impl Default for TimeOfDay {
    fn default() -> Self {
        DEFAULT_WAKE_TIME
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<u32> for TimeOfDay {
    type Error = ComputeError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        if seconds >= SECONDS_PER_DAY {
            return Err(ComputeError::InvalidInput(format!(
                "seconds since midnight must be below {SECONDS_PER_DAY}, got {seconds}"
            )));
        }
        Ok(TimeOfDay(seconds))
    }
}

impl From<TimeOfDay> for u32 {
    fn from(time: TimeOfDay) -> Self {
        time.0
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        // Leap seconds are folded into the last regular second
        TimeOfDay(time.num_seconds_from_midnight().min(SECONDS_PER_DAY - 1))
    }
}

impl FromStr for TimeOfDay {
    type Err = ComputeError;

    /// Parse `HH:MM` or `HH:MM:SS`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
            .map(TimeOfDay::from)
            .map_err(|e| ComputeError::InvalidInput(format!("invalid time of day '{s}': {e}")))
    }
}

/// Inputs for one bedtime calculation.
///
/// A request is built fresh for every calculation and is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepRequest {
    /// When the user wants to wake up
    pub wake_time: TimeOfDay,
    /// Target amount of sleep (hours, 4-12 in 0.25 steps)
    pub desired_sleep_hours: f64,
    /// Daily coffee intake (cups, 0-20)
    pub coffee_cups: u8,
}

impl Default for SleepRequest {
    fn default() -> Self {
        Self {
            wake_time: DEFAULT_WAKE_TIME,
            desired_sleep_hours: DEFAULT_SLEEP_HOURS,
            coffee_cups: 0,
        }
    }
}

impl SleepRequest {
    pub fn new(wake_time: TimeOfDay, desired_sleep_hours: f64, coffee_cups: u8) -> Self {
        Self {
            wake_time,
            desired_sleep_hours,
            coffee_cups,
        }
    }

    /// Build a request the way the form controls constrain input: sleep is
    /// snapped to the stepper grid and both values are held inside their range.
    pub fn clamped(wake_time: TimeOfDay, desired_sleep_hours: f64, coffee_cups: u32) -> Self {
        let hours = if desired_sleep_hours.is_finite() {
            (desired_sleep_hours / SLEEP_HOURS_STEP).round() * SLEEP_HOURS_STEP
        } else {
            DEFAULT_SLEEP_HOURS
        };

        Self {
            wake_time,
            desired_sleep_hours: hours.clamp(MIN_SLEEP_HOURS, MAX_SLEEP_HOURS),
            coffee_cups: coffee_cups.min(MAX_COFFEE_CUPS as u32) as u8,
        }
    }

    /// Check the request against the ranges offered by the form controls
    pub fn validate(&self) -> Result<(), ComputeError> {
        let hours = self.desired_sleep_hours;

        if !hours.is_finite() || !(MIN_SLEEP_HOURS..=MAX_SLEEP_HOURS).contains(&hours) {
            return Err(ComputeError::InvalidInput(format!(
                "desired sleep must be between {MIN_SLEEP_HOURS} and {MAX_SLEEP_HOURS} hours, got {hours}"
            )));
        }

        let steps = hours / SLEEP_HOURS_STEP;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(ComputeError::InvalidInput(format!(
                "desired sleep must be a multiple of {SLEEP_HOURS_STEP} hours, got {hours}"
            )));
        }

        if self.coffee_cups > MAX_COFFEE_CUPS {
            return Err(ComputeError::InvalidInput(format!(
                "coffee intake must be at most {MAX_COFFEE_CUPS} cups, got {}",
                self.coffee_cups
            )));
        }

        Ok(())
    }
}

/// Output of the sleep model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Estimated sleep actually needed (hours)
    pub predicted_sleep_hours: f64,
    /// Version of the coefficient set that produced the estimate
    pub model_version: String,
}

/// Result of evaluating the sleep model
pub type PredictionResult = Result<Prediction, ComputeError>;

/// A successfully calculated bedtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bedtime {
    /// Bedtime on the 24-hour clock
    pub time: TimeOfDay,
    /// `HH:MM` rendering of `time`
    pub formatted: String,
    /// Sleep duration the bedtime was derived from (hours)
    pub predicted_sleep_hours: f64,
}

/// Result of a full calculation; the error side is always
/// [`ComputeError::CalculationFailed`]
pub type BedtimeResult = Result<Bedtime, ComputeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_time_of_day_components() {
        let time = TimeOfDay::from_hms(23, 5, 9).unwrap();
        assert_eq!(time.seconds(), 83_109);
        assert_eq!((time.hour(), time.minute(), time.second()), (23, 5, 9));
        assert_eq!(time.to_string(), "23:05");
    }

    #[test]
    fn test_time_of_day_rejects_out_of_range() {
        assert!(TimeOfDay::from_hm(24, 0).is_err());
        assert!(TimeOfDay::from_hm(7, 60).is_err());
        assert!(TimeOfDay::try_from(SECONDS_PER_DAY).is_err());
        assert!(TimeOfDay::try_from(SECONDS_PER_DAY - 1).is_ok());
    }

    #[test]
    fn test_from_seconds_wraps() {
        assert_eq!(TimeOfDay::from_seconds(-1).seconds(), 86_399);
        assert_eq!(TimeOfDay::from_seconds(86_400).seconds(), 0);
        assert_eq!(TimeOfDay::from_seconds(1800 - 28_800).seconds(), 59_400);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!("07:00".parse::<TimeOfDay>().unwrap().seconds(), 25_200);
        assert_eq!("00:30:15".parse::<TimeOfDay>().unwrap().seconds(), 1_815);
        assert_eq!(" 23:59 ".parse::<TimeOfDay>().unwrap().to_string(), "23:59");
        assert!("7am".parse::<TimeOfDay>().is_err());
        assert!("25:00".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn test_time_of_day_serde_as_seconds() {
        let time = TimeOfDay::from_hm(7, 0).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "25200");

        let parsed: TimeOfDay = serde_json::from_str("1800").unwrap();
        assert_eq!(parsed.to_string(), "00:30");

        assert!(serde_json::from_str::<TimeOfDay>("90000").is_err());
    }

    #[test]
    fn test_default_request() {
        let request = SleepRequest::default();
        assert_eq!(request.wake_time.to_string(), "07:00");
        assert_eq!(request.desired_sleep_hours, 8.0);
        assert_eq!(request.coffee_cups, 0);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_clamped_request() {
        let wake = TimeOfDay::MIDNIGHT;

        let request = SleepRequest::clamped(wake, 8.1, 3);
        assert_eq!(request.desired_sleep_hours, 8.0);

        let request = SleepRequest::clamped(wake, 8.2, 3);
        assert_eq!(request.desired_sleep_hours, 8.25);

        let request = SleepRequest::clamped(wake, 2.0, 50);
        assert_eq!(request.desired_sleep_hours, MIN_SLEEP_HOURS);
        assert_eq!(request.coffee_cups, MAX_COFFEE_CUPS);

        let request = SleepRequest::clamped(wake, 30.0, 0);
        assert_eq!(request.desired_sleep_hours, MAX_SLEEP_HOURS);

        let request = SleepRequest::clamped(wake, f64::NAN, 0);
        assert_eq!(request.desired_sleep_hours, DEFAULT_SLEEP_HOURS);
    }

    #[test]
    fn test_validate_boundaries() {
        let wake = DEFAULT_WAKE_TIME;
        assert!(SleepRequest::new(wake, 4.0, 0).validate().is_ok());
        assert!(SleepRequest::new(wake, 12.0, 20).validate().is_ok());
        assert!(SleepRequest::new(wake, 3.75, 0).validate().is_err());
        assert!(SleepRequest::new(wake, 12.25, 0).validate().is_err());
        assert!(SleepRequest::new(wake, 8.1, 0).validate().is_err());
        assert!(SleepRequest::new(wake, 8.0, 21).validate().is_err());
        assert!(SleepRequest::new(wake, f64::INFINITY, 0).validate().is_err());
    }

    #[test]
    fn test_request_json_shape() {
        let request: SleepRequest = serde_json::from_str(
            r#"{"wake_time": 25200, "desired_sleep_hours": 7.5, "coffee_cups": 2}"#,
        )
        .unwrap();
        assert_eq!(request, SleepRequest::new(DEFAULT_WAKE_TIME, 7.5, 2));
    }
}
