use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;

/// Parses an upstream numeric field, treating anything absent or
/// non-numeric as zero.
///
/// Upstream payloads mix JSON numbers and numeric strings for the same
/// fields, so both are accepted. Numbers go through their JSON text so no
/// binary float rounding leaks into money figures.
pub fn parse_or_zero(value: Option<&Value>) -> BigDecimal {
    let parsed = match value {
        Some(Value::Number(n)) => BigDecimal::from_str(&n.to_string()).ok(),
        Some(Value::String(s)) => BigDecimal::from_str(s.trim()).ok(),
        _ => None,
    };
    parsed.unwrap_or_default()
}

/// First present field among `keys`, parsed with [`parse_or_zero`].
pub fn field_or_zero(record: &Value, keys: &[&str]) -> BigDecimal {
    parse_or_zero(first_field(record, keys))
}

/// Lossy view of a decimal for ratios and fixed-width display.
pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// First field among `keys` that exists and is not null.
pub fn first_field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find(|v| !v.is_null())
}

/// Integer market identifier from a number or a numeric string.
pub fn parse_market_id(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Epoch values below this are taken as seconds, above as milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Trade log timestamp: RFC 3339 text or an epoch number.
pub fn parse_timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| s.trim().parse::<i64>().ok().and_then(from_epoch)),
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        _ => None,
    }
}

fn from_epoch(ts: i64) -> Option<DateTime<Utc>> {
    if ts.abs() < MILLIS_THRESHOLD {
        DateTime::from_timestamp(ts, 0)
    } else {
        DateTime::from_timestamp_millis(ts)
    }
}
