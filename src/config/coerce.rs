//! Best-effort conversions from tree nodes to scalar types.
//!
//! Every function here returns `None` when the conversion does not apply;
//! turning that into the caller's default is left to the accessors on
//! [`Config`](super::Config).

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};

/// Canonical text of a scalar. Containers and null have none.
pub fn to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text of any node: scalars as [`to_text`], everything else as compact JSON.
pub fn to_text_lossy(value: &Value) -> String {
    to_text(value).unwrap_or_else(|| value.to_string())
}

pub fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        _ => None,
    }
}

pub fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => Some(number_to_int(n)),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

/// Integer conversion used for list elements: anything unconvertible is zero.
pub fn to_int_or_zero(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        other => to_int(other).unwrap_or(0),
    }
}

pub fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub fn to_duration(value: &Value) -> Option<Duration> {
    value.as_str().and_then(parse_duration)
}

pub fn to_time(value: &Value, layout: &str) -> Option<DateTime<Utc>> {
    value.as_str().and_then(|s| parse_time(s, layout))
}

fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64's Display drops the ".0" that Number's Display would keep.
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

fn number_to_int(n: &Number) -> i64 {
    if let Some(i) = n.as_i64() {
        i
    } else if n.as_u64().is_some() {
        i64::MAX
    } else {
        n.as_f64().map(round_half_away).unwrap_or(0)
    }
}

/// Rounds to the nearest integer, ties away from zero. Saturates at the
/// `i64` bounds.
pub fn round_half_away(f: f64) -> i64 {
    if f < 0.0 {
        (f - 0.5) as i64
    } else {
        (f + 0.5) as i64
    }
}

/// Parses the boolean spellings `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a signed integer literal. The base follows the prefix: `0x` hex,
/// `0o` or a bare leading `0` octal, `0b` binary, decimal otherwise.
pub fn parse_int(s: &str) -> Option<i64> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ci(unsigned, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(unsigned, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ci(unsigned, "0b") {
        (2, rest)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // from_str_radix would accept a second sign.
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Parses durations such as `300ms`, `1m2s`, `1.5h` or `2h45m`.
///
/// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `0` is
/// accepted without a unit. Negative durations cannot be represented and
/// are rejected, except for negative zero.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let (negative, mut rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(after) => split_digits(after),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_end = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_end);
        let scale = unit_nanos(unit)?;

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        total = total.checked_add(whole.checked_mul(scale)?)?;
        total = total.checked_add(fraction_nanos(fraction, scale)?)?;
        rest = after;
    }

    if total > i64::MAX as u128 || (negative && total > 0) {
        return None;
    }
    Some(Duration::from_nanos(u64::try_from(total).ok()?))
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "\u{b5}s" | "\u{3bc}s" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

fn fraction_nanos(digits: &str, scale: u128) -> Option<u128> {
    // Precision beyond 18 digits is below a nanosecond of any unit.
    let digits = &digits[..digits.len().min(18)];
    if digits.is_empty() {
        return Some(0);
    }
    let value: u128 = digits.parse().ok()?;
    Some(value * scale / 10u128.pow(digits.len() as u32))
}

/// Parses a timestamp with a chrono `strftime` layout.
///
/// Layouts with an offset are converted to UTC; layouts without one are
/// taken as UTC, and date-only layouts as midnight UTC.
pub fn parse_time(text: &str, layout: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(text, layout) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
        return Some(dt.and_utc());
    }
    let date = NaiveDate::parse_from_str(text, layout).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
