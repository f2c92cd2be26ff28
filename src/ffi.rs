//! FFI bindings for BetterRest
//!
//! This module provides C-compatible functions for calling BetterRest from a
//! mobile front end. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using
//! `betterrest_free_string`.
//!
//! Calculation results are the JSON encoding of the calculation state:
//! `{"state":"computed","bedtime":{...}}` or
//! `{"state":"failed","message":"..."}`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::ComputeError;
use crate::model::PredictionEngine;
use crate::pipeline::{calculate, calculate_json, BedtimeProcessor};
use crate::state::CalculationState;
use crate::types::{SleepRequest, TimeOfDay};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Build a request from raw C inputs
fn request_from_parts(
    wake_seconds: u32,
    desired_sleep_hours: f64,
    coffee_cups: u32,
) -> Result<SleepRequest, ComputeError> {
    let wake_time = TimeOfDay::try_from(wake_seconds)?;
    let coffee_cups = u8::try_from(coffee_cups).map_err(|_| {
        ComputeError::InvalidInput(format!("coffee_cups out of range: {coffee_cups}"))
    })?;
    Ok(SleepRequest::new(wake_time, desired_sleep_hours, coffee_cups))
}

/// Serialize a state, recording any failure as the last error
fn state_to_cstr(state: &CalculationState) -> *mut c_char {
    match serde_json::to_string(state) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Calculate a bedtime with the bundled sleep model.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `betterrest_free_string`.
/// - Returns NULL if the inputs cannot form a request; call `betterrest_last_error`
///   to get the error message. A failed calculation is not an FFI error: it is
///   returned as a `failed` state.
#[no_mangle]
pub unsafe extern "C" fn betterrest_calculate(
    wake_seconds: u32,
    desired_sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    clear_last_error();

    let request = match request_from_parts(wake_seconds, desired_sleep_hours, coffee_cups) {
        Ok(request) => request,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    state_to_cstr(&CalculationState::from_result(&calculate(&request)))
}

/// Calculate a bedtime from a JSON request with the bundled sleep model.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `betterrest_free_string`.
/// - Returns NULL on error; call `betterrest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn betterrest_calculate_json(request_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    match calculate_json(PredictionEngine::shared(), &json_str) {
        Ok(state) => string_to_cstr(&state),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a BedtimeProcessor
pub struct BedtimeProcessorHandle {
    processor: BedtimeProcessor,
}

/// Create a processor over the bundled sleep model.
///
/// # Safety
/// - Returns a pointer to a newly allocated processor.
/// - Must be freed with `betterrest_processor_free`.
#[no_mangle]
pub unsafe extern "C" fn betterrest_processor_new() -> *mut BedtimeProcessorHandle {
    clear_last_error();

    let handle = Box::new(BedtimeProcessorHandle {
        processor: BedtimeProcessor::new(),
    });
    Box::into_raw(handle)
}

/// Create a processor from a JSON coefficient asset.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - Must be freed with `betterrest_processor_free`.
/// - Returns NULL if the model is unavailable; call `betterrest_last_error`
///   to get the error message.
#[no_mangle]
pub unsafe extern "C" fn betterrest_processor_from_model_json(
    model_json: *const c_char,
) -> *mut BedtimeProcessorHandle {
    clear_last_error();

    let json_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model string pointer");
            return ptr::null_mut();
        }
    };

    match PredictionEngine::from_json(&json_str) {
        Ok(engine) => {
            let handle = Box::new(BedtimeProcessorHandle {
                processor: BedtimeProcessor::with_engine(engine),
            });
            Box::into_raw(handle)
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a processor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by a `betterrest_processor_*`
///   constructor, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn betterrest_processor_free(processor: *mut BedtimeProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Run one calculation on a processor and return the new state.
///
/// # Safety
/// - `processor` must be a valid pointer returned by a `betterrest_processor_*`
///   constructor.
/// - Returns a newly allocated string that must be freed with `betterrest_free_string`.
/// - Returns NULL on error; call `betterrest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn betterrest_processor_calculate(
    processor: *mut BedtimeProcessorHandle,
    wake_seconds: u32,
    desired_sleep_hours: f64,
    coffee_cups: u32,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let request = match request_from_parts(wake_seconds, desired_sleep_hours, coffee_cups) {
        Ok(request) => request,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    state_to_cstr(handle.processor.calculate(&request))
}

/// Return the alert for the processor's current state as JSON
/// (`{"title":...,"message":...}`), or `null` while idle.
///
/// # Safety
/// - `processor` must be a valid pointer returned by a `betterrest_processor_*`
///   constructor.
/// - Returns a newly allocated string that must be freed with `betterrest_free_string`.
/// - Returns NULL on error; call `betterrest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn betterrest_processor_alert(
    processor: *mut BedtimeProcessorHandle,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &*processor;

    match serde_json::to_string(&handle.processor.state().alert()) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by BetterRest functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a BetterRest function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn betterrest_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next BetterRest function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn betterrest_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the BetterRest library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn betterrest_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
