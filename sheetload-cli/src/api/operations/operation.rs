//! Core Operation types for table writes

use serde_json::{Map, Value};

use crate::api::query::Filter;

/// A JSON row as sent to the store
pub type Row = Map<String, Value>;

/// How rows are written to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Plain insert, fails on an existing key
    Insert,
    /// Insert or update, matched on the key column
    Upsert,
}

impl WriteMode {
    /// Present participle for progress lines ("inserting", "upserting")
    pub fn verb(&self) -> &'static str {
        match self {
            WriteMode::Insert => "inserting",
            WriteMode::Upsert => "upserting",
        }
    }

    /// Past tense for progress lines ("uploaded", "upserted")
    pub fn past_tense(&self) -> &'static str {
        match self {
            WriteMode::Insert => "uploaded",
            WriteMode::Upsert => "upserted",
        }
    }
}

/// Represents a single request that can be executed against a table store
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Insert rows
    Insert {
        /// Table name (e.g., "coatings")
        table: String,
        /// Rows as JSON objects
        rows: Vec<Row>,
    },
    /// Insert rows, merging into existing rows that share the conflict column
    Upsert {
        /// Table name
        table: String,
        /// Rows as JSON objects
        rows: Vec<Row>,
        /// Unique column used to detect existing rows (e.g., "sku")
        on_conflict: String,
    },
    /// Delete every row matching a filter
    Delete {
        /// Table name
        table: String,
        /// Row filter, required by the store even when deleting everything
        filter: Filter,
    },
}

impl Operation {
    /// Create a new Insert operation
    pub fn insert(table: impl Into<String>, rows: Vec<Row>) -> Self {
        Self::Insert {
            table: table.into(),
            rows,
        }
    }

    /// Create a new Upsert operation
    pub fn upsert(table: impl Into<String>, rows: Vec<Row>, on_conflict: impl Into<String>) -> Self {
        Self::Upsert {
            table: table.into(),
            rows,
            on_conflict: on_conflict.into(),
        }
    }

    /// Create a new Delete operation
    pub fn delete(table: impl Into<String>, filter: Filter) -> Self {
        Self::Delete {
            table: table.into(),
            filter,
        }
    }

    /// Create an insert or upsert depending on the write mode
    pub fn write(
        mode: WriteMode,
        table: impl Into<String>,
        rows: Vec<Row>,
        key_column: impl Into<String>,
    ) -> Self {
        match mode {
            WriteMode::Insert => Self::insert(table, rows),
            WriteMode::Upsert => Self::upsert(table, rows, key_column),
        }
    }

    /// Get the table name for this operation
    pub fn table(&self) -> &str {
        match self {
            Self::Insert { table, .. } => table,
            Self::Upsert { table, .. } => table,
            Self::Delete { table, .. } => table,
        }
    }

    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "POST",
            Self::Upsert { .. } => "POST", // Upsert is a POST with a merge preference
            Self::Delete { .. } => "DELETE",
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Upsert { .. } => "upsert",
            Self::Delete { .. } => "delete",
        }
    }

    /// Number of rows carried by this operation
    pub fn row_count(&self) -> usize {
        match self {
            Self::Insert { rows, .. } | Self::Upsert { rows, .. } => rows.len(),
            Self::Delete { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(sku: &str) -> Row {
        match json!({ "sku": sku }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_write_picks_operation() {
        let insert = Operation::write(WriteMode::Insert, "coatings", vec![row("A")], "sku");
        assert_eq!(insert.operation_type(), "insert");
        assert_eq!(insert.row_count(), 1);

        let upsert = Operation::write(WriteMode::Upsert, "coatings", vec![row("A")], "sku");
        match &upsert {
            Operation::Upsert { on_conflict, .. } => assert_eq!(on_conflict, "sku"),
            other => panic!("expected upsert, got {:?}", other),
        }
        assert_eq!(upsert.http_method(), "POST");
        assert_eq!(upsert.table(), "coatings");
    }

    #[test]
    fn test_delete_operation() {
        let op = Operation::delete("coatings", Filter::not_equal("sku", ""));
        assert_eq!(op.http_method(), "DELETE");
        assert_eq!(op.row_count(), 0);
    }
}
