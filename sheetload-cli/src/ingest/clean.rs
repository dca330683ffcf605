//! Table-wide cleaning before upload
//!
//! Runs three passes in a fixed order:
//! 1. NaN / infinity become null
//! 2. float columns holding only whole numbers become integer columns
//! 3. leading and trailing whitespace is stripped from strings
//!
//! Null unification has to run first so the integer check only sees real values.

use log::debug;

use super::{Dataset, Record, Value};

/// Shape of a numeric column after null unification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatColumn {
    /// Every value is a whole number that fits in an i64
    Integral,
    /// At least one value has a fractional part (or is out of i64 range)
    Fractional,
}

/// Clean a dataset, producing a new one
pub fn clean(dataset: Dataset) -> Dataset {
    let (columns, mut records) = dataset.into_parts();

    unify_missing(&mut records);

    for (idx, column) in columns.iter().enumerate() {
        match classify_float_column(&records, idx) {
            Some(FloatColumn::Integral) => {
                debug!("Column '{}': whole-number floats recast to integers", column);
                recast_column(&mut records, idx, |v| match v {
                    Value::Float(f) => Value::Int(*f as i64),
                    other => other.clone(),
                });
            }
            Some(FloatColumn::Fractional) => {
                recast_column(&mut records, idx, |v| match v {
                    Value::Int(i) => Value::Float(*i as f64),
                    other => other.clone(),
                });
            }
            None => {}
        }
    }

    strip_whitespace(&mut records);

    Dataset::from_parts(columns, records)
}

fn unify_missing(records: &mut [Record]) {
    for record in records.iter_mut() {
        for value in record.values_mut() {
            if value.is_missing() {
                *value = Value::Null;
            }
        }
    }
}

/// A column is a float column when all its non-null values are numeric and at
/// least one of them is a float. Int-only, text and empty columns return None.
fn classify_float_column(records: &[Record], idx: usize) -> Option<FloatColumn> {
    let mut saw_float = false;
    let mut integral = true;

    for value in records.iter().filter_map(|r| r.value_at(idx)) {
        match value {
            Value::Null => {}
            Value::Int(_) => {}
            Value::Float(f) => {
                saw_float = true;
                if !is_integral(*f) {
                    integral = false;
                }
            }
            _ => return None,
        }
    }

    if !saw_float {
        return None;
    }

    Some(if integral {
        FloatColumn::Integral
    } else {
        FloatColumn::Fractional
    })
}

fn is_integral(f: f64) -> bool {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn recast_column(records: &mut [Record], idx: usize, f: impl Fn(&Value) -> Value) {
    for record in records.iter_mut() {
        if let Some(value) = record.value_at_mut(idx) {
            *value = f(value);
        }
    }
}

fn strip_whitespace(records: &mut [Record]) {
    for record in records.iter_mut() {
        for value in record.values_mut() {
            if let Value::String(s) = value {
                let trimmed = s.trim();
                if trimmed.len() != s.len() {
                    *s = trimmed.to_string();
                }
            }
        }
    }
}
