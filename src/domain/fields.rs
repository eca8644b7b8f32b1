//! Flat field mappings exchanged with the document store

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Flat mapping of field names to primitive values (text, numbers)
pub type FieldMap = serde_json::Map<String, Value>;

/// Reads a text field, falling back to an empty string when absent or mistyped
pub fn text_field(fields: &FieldMap, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Reads a numeric field, falling back to zero when absent or mistyped
pub fn number_field(fields: &FieldMap, key: &str) -> f64 {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Converts a timestamp to elapsed seconds since the Unix epoch
pub fn timestamp_to_seconds(timestamp: DateTime<Utc>) -> f64 {
    timestamp.timestamp_micros() as f64 / 1_000_000.0
}

/// Converts elapsed seconds since the Unix epoch to a timestamp
///
/// Values outside the representable range collapse to the epoch.
pub fn seconds_to_timestamp(seconds: f64) -> DateTime<Utc> {
    if !seconds.is_finite() {
        return DateTime::<Utc>::default();
    }

    DateTime::from_timestamp_micros((seconds * 1_000_000.0).round() as i64).unwrap_or_default()
}
