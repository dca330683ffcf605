//! Per-value conversion into a JSON-safe form

use super::{Value, format_iso8601};

/// Convert a single value into a form the store can accept as JSON.
///
/// - NaN and infinities become null
/// - timestamps become ISO-8601 strings
/// - sequences are normalized element by element
/// - everything else passes through unchanged, including values with no JSON
///   form at all (raw bytes); those are caught when the record is serialized
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Float(f) if !f.is_finite() => Value::Null,
        Value::DateTime(dt) => Value::String(format_iso8601(dt)),
        Value::Sequence(items) => Value::Sequence(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}
