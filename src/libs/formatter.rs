//! Formatting helpers for durations, amounts and table cells.
//!
//! ## Formats
//!
//! - `HH:MM` for durations shown to people (negative durations are shown as
//!   `00:00`)
//! - ISO 8601 durations (`P1DT2H31M0S`) for OpenProject bookings
//! - two-decimal amounts with a comma separator (`12,50`) for invoices
//!
//! ```rust
//! use tmop::libs::formatter::{format_duration, format_iso8601_duration};
//! use chrono::Duration;
//!
//! let duration = Duration::hours(26) + Duration::minutes(31);
//! assert_eq!(format_duration(&duration), "26:31");
//! assert_eq!(format_iso8601_duration(&duration), "P1DT2H31M0S");
//! ```

use super::error::{Error, Result};
use chrono::Duration;

/// Formats a duration as `HH:MM`, clamping negative values to zero.
///
/// Seconds are truncated.
pub fn format_duration(duration: &Duration) -> String {
    let hours = duration.num_hours();
    let mins = duration.num_minutes() % 60;

    format!("{:02}:{:02}", hours.max(0), mins.max(0))
}

/// Formats a non-negative duration as `P{days}DT{hours}H{minutes}M{seconds}S`.
pub fn format_iso8601_duration(duration: &Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "P{}DT{}H{}M{}S",
        total / 86_400,
        (total / 3_600) % 24,
        (total / 60) % 60,
        total % 60
    )
}

/// Parses an ISO 8601 duration such as `PT7H30M`, `P1DT2H` or `PT1.5H`.
///
/// Years and months have no fixed length and are rejected, as are repeated
/// or out-of-order units and a `T` without any time part.
pub fn parse_iso8601_duration(value: &str) -> Result<Duration> {
    let invalid = || Error::validation(format!("could not parse duration: '{value}'"));

    let rest = value.trim().strip_prefix('P').ok_or_else(invalid)?;
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut seconds = 0f64;
    let mut number = String::new();
    let mut in_time = false;
    let mut time_units = 0;
    let mut last_rank = None;

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' | ',' => number.push(if c == ',' { '.' } else { c }),
            'T' if !in_time && number.is_empty() => in_time = true,
            unit => {
                let (rank, factor) = match (in_time, unit) {
                    (false, 'W') => (0, 604_800.0),
                    (false, 'D') => (1, 86_400.0),
                    (true, 'H') => (2, 3_600.0),
                    (true, 'M') => (3, 60.0),
                    (true, 'S') => (4, 1.0),
                    _ => return Err(invalid()),
                };
                // Each unit at most once, largest first.
                if last_rank.is_some_and(|last| rank <= last) {
                    return Err(invalid());
                }
                last_rank = Some(rank);

                let amount: f64 = number.parse().map_err(|_| invalid())?;
                number.clear();
                if in_time {
                    time_units += 1;
                }
                seconds += amount * factor;
            }
        }
    }

    if !number.is_empty() || (in_time && time_units == 0) {
        return Err(invalid());
    }

    Ok(Duration::milliseconds((seconds * 1000.0).round() as i64))
}

/// Formats a number with two decimals and a comma as decimal separator.
pub fn format_float(value: f64) -> String {
    format!("{value:.2}").replace('.', ",")
}

/// Shortens `text` to at most `width` characters, ending with `~` when cut.
pub fn snip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut snipped: String = text.chars().take(width - 1).collect();
    snipped.push('~');
    snipped
}
