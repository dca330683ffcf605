//! Row filters for delete requests

use serde_json::Value;

use crate::api::operations::Row;

/// A condition selecting rows of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Column value differs from the given text
    NotEqual { column: String, value: String },
}

impl Filter {
    pub fn not_equal(column: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::NotEqual {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Render as a PostgREST query parameter, e.g. `("sku", "neq.")`
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::NotEqual { column, value } => (column.clone(), format!("neq.{}", value)),
        }
    }

    /// Evaluate the filter against a row with SQL semantics: a NULL or
    /// missing column never matches.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::NotEqual { column, value } => match row.get(column) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => s != value,
                Some(other) => other.to_string() != *value,
            },
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::NotEqual { column, value } => write!(f, "{} != '{}'", column, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_query_pair() {
        let filter = Filter::not_equal("sku", "");
        assert_eq!(
            filter.to_query_pair(),
            ("sku".to_string(), "neq.".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Filter::not_equal("sku", "").to_string(), "sku != ''");
    }

    #[test]
    fn test_matches_every_non_empty_key() {
        let filter = Filter::not_equal("sku", "");
        assert!(filter.matches(&row(json!({"sku": "A1"}))));
        assert!(filter.matches(&row(json!({"sku": 1042}))));
        assert!(!filter.matches(&row(json!({"sku": ""}))));
        assert!(!filter.matches(&row(json!({"sku": null}))));
        assert!(!filter.matches(&row(json!({"name": "x"}))));
    }
}
