//! Records and datasets

use serde_json::{Map, Value as JsonValue};

use super::Value;

/// One row of the source file, fields kept in column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Callers keep column names unique.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    /// Builder-style `push`
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.push(column, value);
        self
    }

    /// Look up a field by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Field value at a column position
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.fields.get(index).map(|(_, value)| value)
    }

    /// Mutable field value at a column position
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.fields.get_mut(index).map(|(_, value)| value)
    }

    /// Iterate fields in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate values mutably in column order
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.fields.iter_mut().map(|(_, value)| value)
    }

    /// Rebuild the record with every value passed through `f`
    pub fn map_values(&self, f: impl Fn(&Value) -> Value) -> Record {
        Record {
            fields: self
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), f(value)))
                .collect(),
        }
    }

    /// Key value rendered as text, for log lines and reports
    pub fn key_text(&self, key_column: &str) -> Option<String> {
        match self.get(key_column)? {
            Value::Null => None,
            value => Some(value.to_string()),
        }
    }

    /// Lossy JSON object, see [`Value::to_json_lossy`]
    pub fn to_json_lossy(&self) -> Map<String, JsonValue> {
        self.fields
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json_lossy()))
            .collect()
    }
}

/// An ordered set of records sharing the same columns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Create an empty dataset with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Append a row of values in column order.
    ///
    /// Short rows are padded with nulls, extra cells are dropped, so every
    /// record ends up with exactly the dataset's columns.
    pub fn push_row(&mut self, mut values: Vec<Value>) {
        values.resize(self.columns.len(), Value::Null);
        let record = Record {
            fields: self.columns.iter().cloned().zip(values).collect(),
        };
        self.records.push(record);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Position of a column by name
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// All values of one column, in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.records.iter().filter_map(move |r| r.value_at(index))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split into columns and records
    pub fn into_parts(self) -> (Vec<String>, Vec<Record>) {
        (self.columns, self.records)
    }

    /// Reassemble from parts produced by [`Dataset::into_parts`]
    pub fn from_parts(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }
}
