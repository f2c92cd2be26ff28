//! Property-based invariant tests for the bedtime pipeline.
//!
//! 1. Bedtime always lands on the 24-hour clock.
//! 2. Whole-second durations subtract exactly, modulo one day.
//! 3. Formatting is `HH:MM` and drops seconds.
//! 4. Every request the form can produce yields a bedtime with the bundled model.
//! 5. Calculations are deterministic.
//! 6. A missing model always surfaces as the generic failure.
//! 7. Clamped requests always validate.

use betterrest::bedtime::BedtimeCalculator;
use betterrest::model::{CoefficientSet, ModelWeights, PredictionEngine};
use betterrest::state::CalculationState;
use betterrest::types::{MAX_COFFEE_CUPS, SECONDS_PER_DAY};
use betterrest::{calculate, calculate_with, ComputeError, SleepRequest, TimeOfDay};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn wake_strategy() -> impl Strategy<Value = TimeOfDay> {
    (0u32..SECONDS_PER_DAY).prop_map(|s| TimeOfDay::try_from(s).unwrap())
}

/// Sleep values the stepper can produce: 4 to 12 hours in quarter steps
fn stepper_hours_strategy() -> impl Strategy<Value = f64> {
    (16u32..=48).prop_map(|quarters| quarters as f64 * 0.25)
}

fn request_strategy() -> impl Strategy<Value = SleepRequest> {
    (
        wake_strategy(),
        stepper_hours_strategy(),
        0u8..=MAX_COFFEE_CUPS,
    )
        .prop_map(|(wake, hours, cups)| SleepRequest::new(wake, hours, cups))
}

fn identity_engine() -> PredictionEngine {
    PredictionEngine::new(CoefficientSet::new(
        "identity",
        0.0,
        ModelWeights {
            wake: 0.0,
            estimated_sleep: 1.0,
            coffee: 0.0,
        },
    ))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Bedtime always lands on the 24-hour clock
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bedtime_within_day(wake in wake_strategy(), hours in 0.001f64..1000.0) {
        let bedtime = BedtimeCalculator::bedtime(wake, hours).unwrap();
        prop_assert!(
            bedtime.seconds() < SECONDS_PER_DAY,
            "bedtime {} out of range for wake={}, hours={}",
            bedtime.seconds(), wake, hours
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Whole-second durations subtract exactly
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn whole_second_durations_are_exact(wake in wake_strategy(), sleep_seconds in 1u32..172_800) {
        let hours = sleep_seconds as f64 / 3600.0;
        let bedtime = BedtimeCalculator::bedtime(wake, hours).unwrap();

        let expected = (wake.seconds() as i64 - sleep_seconds as i64)
            .rem_euclid(SECONDS_PER_DAY as i64);

        // Dividing by 3600 can leave the product a hair below the whole second
        let diff = (bedtime.seconds() as i64 - expected).rem_euclid(SECONDS_PER_DAY as i64);
        prop_assert!(
            diff == 0 || diff == SECONDS_PER_DAY as i64 - 1,
            "wake={}, sleep_seconds={}, got {}, expected {}",
            wake.seconds(), sleep_seconds, bedtime.seconds(), expected
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Formatting is HH:MM and drops seconds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn format_is_zero_padded_and_truncated(time in wake_strategy()) {
        let text = BedtimeCalculator::format(time);
        prop_assert_eq!(text.len(), 5);
        prop_assert_eq!(&text[2..3], ":");

        let reparsed: TimeOfDay = text.parse().unwrap();
        prop_assert_eq!(reparsed.seconds(), time.seconds() - time.second());
        prop_assert_eq!(BedtimeCalculator::format(reparsed), text);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Every form request yields a bedtime with the bundled model
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bundled_model_covers_form_inputs(request in request_strategy()) {
        prop_assert!(request.validate().is_ok());

        let bedtime = calculate(&request).unwrap();
        prop_assert!(bedtime.predicted_sleep_hours.is_finite());
        prop_assert!(bedtime.predicted_sleep_hours > 0.0);
        prop_assert_eq!(bedtime.formatted.clone(), BedtimeCalculator::format(bedtime.time));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Calculations are deterministic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn calculation_is_deterministic(request in request_strategy()) {
        let engine = identity_engine();
        prop_assert_eq!(
            calculate_with(&engine, &request).unwrap(),
            calculate_with(&engine, &request).unwrap()
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. A missing model always surfaces as the generic failure
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn unavailable_model_always_fails_generically(request in request_strategy()) {
        let engine = PredictionEngine::unavailable("no asset");
        let result = calculate_with(&engine, &request);
        prop_assert!(matches!(result, Err(ComputeError::CalculationFailed)));

        let state = CalculationState::from_result(&result);
        let alert = state.alert().unwrap();
        prop_assert_eq!(alert.title, "Error");
        prop_assert_eq!(
            alert.message,
            "Sorry, there was a problem calculating your bedtime."
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Clamped requests always validate
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamped_requests_validate(
        wake in wake_strategy(),
        hours in prop::num::f64::ANY,
        cups in any::<u32>(),
    ) {
        let request = SleepRequest::clamped(wake, hours, cups);
        prop_assert!(
            request.validate().is_ok(),
            "clamped request {:?} failed validation", request
        );
    }
}
