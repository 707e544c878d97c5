use crate::error::{CoreError, Result};

/// Formats a seconds offset as a zero-padded `HH:MM:SS.mmm` timestamp.
///
/// The value is rounded to whole milliseconds first, so any seconds value
/// produced by [`timestamp_to_seconds`] formats back to the same string.
/// Hours grow beyond two digits when needed.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1_000.0).round().max(0.0) as u64;
    let ms = total_ms % 1_000;
    let total_secs = total_ms / 1_000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;
    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
}

/// Parses a `HH:MM:SS.mmm` timestamp into a seconds offset.
///
/// The shape is strict: at least two hour digits, exactly two minute and
/// second digits (each below 60) and exactly three millisecond digits.
/// Anything else is a [`CoreError::MalformedTimestamp`].
pub fn timestamp_to_seconds(text: &str) -> Result<f64> {
    let malformed = || CoreError::MalformedTimestamp(text.to_string());

    let mut parts = text.split(':');
    let hours = parts.next().ok_or_else(malformed)?;
    let mins = parts.next().ok_or_else(malformed)?;
    let rest = parts.next().ok_or_else(malformed)?;
    if parts.next().is_some() {
        return Err(malformed());
    }

    let (secs, millis) = rest.split_once('.').ok_or_else(malformed)?;

    if hours.len() < 2 || mins.len() != 2 || secs.len() != 2 || millis.len() != 3 {
        return Err(malformed());
    }

    let hours = parse_digits(hours).ok_or_else(malformed)?;
    let mins = parse_digits(mins).filter(|&m| m < 60).ok_or_else(malformed)?;
    let secs = parse_digits(secs).filter(|&s| s < 60).ok_or_else(malformed)?;
    let millis = parse_digits(millis).ok_or_else(malformed)?;

    let total_ms = ((hours * 60 + mins) * 60 + secs) * 1_000 + millis;
    Ok(total_ms as f64 / 1_000.0)
}

/// Rounds a seconds value to whole-millisecond precision.
pub fn round_to_ms(seconds: f64) -> f64 {
    (seconds * 1_000.0).round() / 1_000.0
}

fn parse_digits(text: &str) -> Option<u64> {
    if text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
