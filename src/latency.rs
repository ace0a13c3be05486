//! Human-readable latency strings.
//!
//! Durations are rendered as the largest-unit-first form proxy tooling already prints:
//! `0s`, `850ns`, `1.5µs`, `40ms`, `2.25s`, `1m30s`, `1h0m0s`. Sub-second values use a
//! single unit with trailing zeros trimmed; values of a second or more are broken into
//! hours, minutes and (fractional) seconds.

use crate::error::{Result, SelectorError};
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SEC;

/// Formats a duration, e.g. `40ms` or `1h0m0s`.
pub fn format_latency(latency: Duration) -> String {
    let nanos = latency.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return with_fraction(nanos, NANOS_PER_MICRO, "µs");
    }
    if nanos < NANOS_PER_SEC {
        return with_fraction(nanos, NANOS_PER_MILLI, "ms");
    }

    let total_secs = latency.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = with_fraction(nanos % NANOS_PER_MINUTE, NANOS_PER_SEC, "s");

    if hours > 0 {
        format!("{}h{}m{}", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}", minutes, seconds)
    } else {
        seconds
    }
}

fn with_fraction(nanos: u128, unit: u128, suffix: &str) -> String {
    let whole = nanos / unit;
    let rem = nanos % unit;
    if rem == 0 {
        return format!("{}{}", whole, suffix);
    }
    let width = unit.to_string().len() - 1;
    let fraction = format!("{:0width$}", rem, width = width);
    format!("{}.{}{}", whole, fraction.trim_end_matches('0'), suffix)
}

/// Parses a string produced by [`format_latency`] (or any `<number><unit>` sequence with
/// units `h`, `m`, `s`, `ms`, `us`/`µs`, `ns`).
///
/// # Errors
///
/// Returns `InvalidField` for empty input, a missing number, or an unknown unit.
pub fn parse_latency(input: &str) -> Result<Duration> {
    let invalid = || SelectorError::InvalidField(format!("Invalid duration: {:?}", input));

    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(invalid());
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos = 0f64;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_len].parse().map_err(|_| invalid())?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "h" => 3_600e9,
            "m" => 60e9,
            "s" => 1e9,
            "ms" => 1e6,
            "us" | "µs" | "μs" => 1e3,
            "ns" => 1.0,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_len..];
        total_nanos += value * scale;
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Serde adapter storing a `Duration` as a human-readable string.
pub mod human {
    use super::{format_latency, parse_latency};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes with [`format_latency`].
    pub fn serialize<S>(latency: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_latency(*latency))
    }

    /// Deserializes with [`parse_latency`].
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_latency(&raw).map_err(D::Error::custom)
    }
}
