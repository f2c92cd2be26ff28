//! Bedtime calculation
//!
//! Subtracts the predicted sleep duration from the wake time on a 24-hour
//! clock and renders the result as `HH:MM`. Subtraction uses a non-negative
//! modulo so a duration longer than the wake offset lands on the previous
//! day's clock time (wake 00:30, sleep 8h gives 16:30).

use crate::error::ComputeError;
use crate::types::{
    Bedtime, BedtimeResult, PredictionResult, TimeOfDay, SECONDS_PER_DAY, SECONDS_PER_HOUR,
};
use tracing::warn;

/// Calculator combining a wake time with a predicted sleep duration
pub struct BedtimeCalculator;

impl BedtimeCalculator {
    /// Turn a model prediction into a formatted bedtime.
    ///
    /// Any upstream failure, whatever its cause, is reported as
    /// [`ComputeError::CalculationFailed`]; the cause is only logged.
    pub fn calculate(wake_time: TimeOfDay, prediction: PredictionResult) -> BedtimeResult {
        let prediction = prediction.map_err(collapse)?;
        let hours = prediction.predicted_sleep_hours;
        let time = Self::bedtime(wake_time, hours).map_err(collapse)?;

        Ok(Bedtime {
            time,
            formatted: Self::format(time),
            predicted_sleep_hours: hours,
        })
    }

    /// Clock time that lies `predicted_sleep_hours` before `wake_time`.
    ///
    /// Sub-second remainders are truncated.
    pub fn bedtime(
        wake_time: TimeOfDay,
        predicted_sleep_hours: f64,
    ) -> Result<TimeOfDay, ComputeError> {
        if !predicted_sleep_hours.is_finite() || predicted_sleep_hours <= 0.0 {
            return Err(ComputeError::PredictionOutOfRange(predicted_sleep_hours));
        }

        let sleep_seconds = predicted_sleep_hours * SECONDS_PER_HOUR as f64;
        let offset =
            (wake_time.seconds() as f64 - sleep_seconds).rem_euclid(SECONDS_PER_DAY as f64);

        // rem_euclid can round up to exactly one day for tiny negative offsets
        let seconds = (offset.floor() as u32).min(SECONDS_PER_DAY - 1);
        Ok(TimeOfDay::from_seconds(seconds as i64))
    }

    /// Render a time of day as zero-padded 24-hour `HH:MM`, dropping seconds
    pub fn format(time: TimeOfDay) -> String {
        format!("{:02}:{:02}", time.hour(), time.minute())
    }
}

fn collapse(cause: ComputeError) -> ComputeError {
    warn!(code = cause.code(), error = %cause, "bedtime calculation failed");
    ComputeError::CalculationFailed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Prediction;
    use pretty_assertions::assert_eq;

    fn prediction(hours: f64) -> PredictionResult {
        Ok(Prediction {
            predicted_sleep_hours: hours,
            model_version: "test".to_string(),
        })
    }

    #[test]
    fn test_wraps_past_midnight() {
        let wake = TimeOfDay::from_hm(0, 30).unwrap();
        let bedtime = BedtimeCalculator::bedtime(wake, 8.0).unwrap();
        assert_eq!(bedtime.seconds(), 59_400);
        assert_eq!(BedtimeCalculator::format(bedtime), "16:30");
    }

    #[test]
    fn test_same_day_without_wrap() {
        let wake = TimeOfDay::from_hm(7, 0).unwrap();
        let bedtime = BedtimeCalculator::bedtime(wake, 8.0).unwrap();
        assert_eq!(bedtime.seconds(), 82_800);
        assert_eq!(BedtimeCalculator::format(bedtime), "23:00");
    }

    #[test]
    fn test_truncates_sub_minute_remainder() {
        // 59.9 seconds short of eight hours leaves 23:00:59.9
        let wake = TimeOfDay::from_hm(7, 0).unwrap();
        let hours = (8.0 * 3600.0 - 59.9) / 3600.0;
        let bedtime = BedtimeCalculator::bedtime(wake, hours).unwrap();
        assert_eq!(bedtime.seconds(), 82_859);
        assert_eq!(BedtimeCalculator::format(bedtime), "23:00");
    }

    #[test]
    fn test_wake_at_midnight() {
        let bedtime = BedtimeCalculator::bedtime(TimeOfDay::MIDNIGHT, 7.5).unwrap();
        assert_eq!(BedtimeCalculator::format(bedtime), "16:30");
    }

    #[test]
    fn test_full_day_duration_wraps_to_wake_time() {
        let wake = TimeOfDay::from_hm(6, 45).unwrap();
        let bedtime = BedtimeCalculator::bedtime(wake, 24.0).unwrap();
        assert_eq!(bedtime, wake);
    }

    #[test]
    fn test_tiny_negative_offset_stays_in_range() {
        let wake = TimeOfDay::from_hm(8, 0).unwrap();
        let hours = 8.0 + 1e-13;
        let bedtime = BedtimeCalculator::bedtime(wake, hours).unwrap();
        assert!(bedtime.seconds() < SECONDS_PER_DAY);
        assert_eq!(BedtimeCalculator::format(bedtime), "23:59");
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let wake = TimeOfDay::MIDNIGHT;
        assert!(BedtimeCalculator::bedtime(wake, 0.0).is_err());
        assert!(BedtimeCalculator::bedtime(wake, -1.0).is_err());
        assert!(BedtimeCalculator::bedtime(wake, f64::NAN).is_err());
    }

    #[test]
    fn test_calculate_success() {
        let wake = TimeOfDay::from_hm(7, 0).unwrap();
        let bedtime = BedtimeCalculator::calculate(wake, prediction(8.5)).unwrap();
        assert_eq!(bedtime.formatted, "22:30");
        assert_eq!(bedtime.predicted_sleep_hours, 8.5);
    }

    #[test]
    fn test_calculate_collapses_model_failure() {
        let wake = TimeOfDay::from_hm(7, 0).unwrap();
        let failed = Err(ComputeError::ModelUnavailable("missing".to_string()));

        let err = BedtimeCalculator::calculate(wake, failed).unwrap_err();
        assert!(matches!(err, ComputeError::CalculationFailed));
        assert_eq!(
            err.to_string(),
            "Sorry, there was a problem calculating your bedtime."
        );
    }

    #[test]
    fn test_calculate_collapses_bad_duration() {
        let wake = TimeOfDay::from_hm(7, 0).unwrap();
        let err = BedtimeCalculator::calculate(wake, prediction(-3.0)).unwrap_err();
        assert!(matches!(err, ComputeError::CalculationFailed));
    }
}
