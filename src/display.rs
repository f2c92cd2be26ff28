//! Display helpers for request values

/// Render a sleep amount in hours as an `HH:MM` duration (8.25 gives `08:15`).
///
/// Partial minutes are truncated.
pub fn format_sleep_amount(hours: f64) -> String {
    let total_minutes = if hours.is_finite() && hours > 0.0 {
        (hours * 60.0) as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// Render a coffee intake with the right noun form
pub fn format_coffee_cups(cups: u8) -> String {
    if cups == 1 {
        "1 cup".to_string()
    } else {
        format!("{cups} cups")
    }
}
