//! Cell value representation for loaded spreadsheets

use chrono::NaiveDateTime;

/// A single field value as read from the source file
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Empty cell
    Null,
    /// Whole number
    Int(i64),
    /// Floating point, may hold NaN or infinity straight from the source
    Float(f64),
    /// Text
    String(String),
    /// Boolean
    Bool(bool),
    /// Date and time without timezone (spreadsheets carry no offset)
    DateTime(NaiveDateTime),
    /// Ordered list of values
    Sequence(Vec<Value>),
    /// Raw bytes that could not be decoded as UTF-8
    Bytes(Vec<u8>),
}

impl Value {
    /// Null, NaN or infinite: everything that should end up as a database NULL
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => !f.is_finite(),
            _ => false,
        }
    }

    /// Null or NaN, the values a spreadsheet tool would report as empty
    pub fn is_na(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Short type label used by inspection output
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::Sequence(_) => "sequence",
            Value::Bytes(_) => "bytes",
        }
    }

    /// Best-effort JSON rendering that never fails.
    ///
    /// Used for diagnostics and the failure report, where a record that could
    /// not be serialized for the store still has to be written down somehow.
    pub fn to_json_lossy(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Int(i) => serde_json::json!(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::DateTime(dt) => serde_json::Value::String(format_iso8601(dt)),
            Value::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json_lossy).collect())
            }
            Value::Bytes(bytes) => {
                serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Format a timestamp as ISO-8601, keeping fractional seconds only when present
pub fn format_iso8601(dt: &NaiveDateTime) -> String {
    use chrono::Timelike;

    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) if fl.is_nan() => write!(f, "NaN"),
            Value::Float(fl) if fl.is_infinite() => {
                write!(f, "{}", if *fl > 0.0 { "inf" } else { "-inf" })
            }
            Value::Float(fl) => write!(f, "{:?}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_missing_markers() {
        assert!(Value::Null.is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(Value::Float(f64::INFINITY).is_missing());
        assert!(Value::Float(f64::NEG_INFINITY).is_missing());
        assert!(!Value::Float(0.0).is_missing());
        assert!(!Value::String(String::new()).is_missing());

        // Infinity is not "na", only missing
        assert!(!Value::Float(f64::INFINITY).is_na());
        assert!(Value::Float(f64::NAN).is_na());
    }

    #[test]
    fn test_format_iso8601() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(format_iso8601(&dt), "2024-01-05T10:30:00");

        let with_millis = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_milli_opt(10, 30, 0, 250)
            .unwrap();
        assert_eq!(format_iso8601(&with_millis), "2024-01-05T10:30:00.250");
    }

    #[test]
    fn test_lossy_json() {
        assert_eq!(Value::Float(f64::NAN).to_json_lossy(), serde_json::Value::Null);
        assert_eq!(
            Value::Bytes(vec![b'a', 0xff]).to_json_lossy(),
            serde_json::json!("a\u{fffd}")
        );
        assert_eq!(
            Value::Sequence(vec![Value::Int(1), Value::Null]).to_json_lossy(),
            serde_json::json!([1, null])
        );
    }
}
