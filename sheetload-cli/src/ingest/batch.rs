//! Batch preparation: chunking, normalization and wire serialization

use serde_json::{Map, Number, Value as JsonValue};

use super::{Record, Value, format_iso8601, normalize};

/// Default number of records per bulk write
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// A record field that has no JSON representation
#[derive(Debug, Clone, PartialEq)]
pub enum SerializeError {
    /// Raw bytes that are not valid UTF-8
    Bytes { column: String },
    /// NaN or infinity that escaped normalization
    NonFinite { column: String },
}

impl std::fmt::Display for SerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializeError::Bytes { column } => {
                write!(f, "column '{}' holds bytes that are not valid UTF-8", column)
            }
            SerializeError::NonFinite { column } => {
                write!(f, "column '{}' holds a NaN or infinite number", column)
            }
        }
    }
}

impl std::error::Error for SerializeError {}

/// Split records into contiguous batches of at most `size` records
pub fn chunk_records(records: &[Record], size: usize) -> Vec<&[Record]> {
    records.chunks(size.max(1)).collect()
}

/// Normalize every field of a record
pub fn prepare_record(record: &Record) -> Record {
    record.map_values(normalize)
}

/// Normalize every field of every record in a batch
pub fn prepare_batch(batch: &[Record]) -> Vec<Record> {
    batch.iter().map(prepare_record).collect()
}

/// Serialize a prepared record into the JSON object sent to the store.
///
/// Keys keep column order.
pub fn to_wire(record: &Record) -> Result<Map<String, JsonValue>, SerializeError> {
    record
        .iter()
        .map(|(column, value)| value_to_json(column, value).map(|json| (column.to_string(), json)))
        .collect()
}

/// Check that a record survives preparation and serialization.
///
/// Run on the first record before any network call so a structurally broken
/// file fails fast instead of batch by batch.
pub fn probe_record(record: &Record) -> Result<Map<String, JsonValue>, SerializeError> {
    to_wire(&prepare_record(record))
}

fn value_to_json(column: &str, value: &Value) -> Result<JsonValue, SerializeError> {
    Ok(match value {
        Value::Null => JsonValue::Null,
        Value::Int(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => match Number::from_f64(*f) {
            Some(n) => JsonValue::Number(n),
            None => {
                return Err(SerializeError::NonFinite {
                    column: column.to_string(),
                });
            }
        },
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::DateTime(dt) => JsonValue::String(format_iso8601(dt)),
        Value::Sequence(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| value_to_json(column, item))
                .collect::<Result<_, _>>()?,
        ),
        Value::Bytes(_) => {
            return Err(SerializeError::Bytes {
                column: column.to_string(),
            });
        }
    })
}
