//! Textual durations such as `500ms`, `2s`, `1m30s` or `1.5h`.
//!
//! A bare number is read as milliseconds, matching the stored encoding.

use std::time::Duration;

use crate::error::{ValueError, ValueResult};

const UNITS: &[(&str, f64)] = &[
    ("ms", 1.0),
    ("s", 1_000.0),
    ("m", 60_000.0),
    ("h", 3_600_000.0),
    ("d", 86_400_000.0),
];

/// Parse a duration string into a [`Duration`].
pub fn parse_duration(input: &str) -> ValueResult<Duration> {
    let invalid = |reason: &str| ValueError::InvalidDuration {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let text = input.trim();
    if text.is_empty() {
        return Err(invalid("empty"));
    }

    if let Ok(ms) = text.parse::<f64>() {
        return millis_to_duration(ms).ok_or_else(|| invalid("out of range"));
    }

    let mut total_ms = 0.0;
    let mut rest = text;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(invalid("expected a number"));
        }
        let amount: f64 = rest[..num_len]
            .parse()
            .map_err(|_| invalid("malformed number"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        let factor = UNITS
            .iter()
            .find(|(name, _)| unit.eq_ignore_ascii_case(name))
            .map(|(_, factor)| *factor)
            .ok_or_else(|| invalid(&format!("unknown unit {unit:?}")))?;
        total_ms += amount * factor;
        rest = rest[unit_len..].trim_start();
    }

    millis_to_duration(total_ms).ok_or_else(|| invalid("out of range"))
}

/// Render a duration as compact text, e.g. `1h5m` or `250ms`.
pub fn format_duration(duration: Duration) -> String {
    let mut ms = duration.as_millis();
    if ms == 0 {
        return "0ms".to_string();
    }

    let mut out = String::new();
    for (name, factor) in UNITS.iter().rev() {
        let factor = *factor as u128;
        let amount = ms / factor;
        if amount > 0 {
            out.push_str(&format!("{amount}{name}"));
            ms %= factor;
        }
    }
    out
}

pub(crate) fn millis_to_duration(ms: f64) -> Option<Duration> {
    if !ms.is_finite() || ms < 0.0 || ms > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_millis(ms.round() as u64))
}
