//! Errors returned by the table store

use serde::Deserialize;

/// Postgres SQLSTATE for a unique constraint violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// A failed store request
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The request never got an HTTP response (DNS, connect, TLS, timeout)
    Transport { message: String },
    /// The store answered with a non-success status
    Api {
        status: u16,
        /// SQLSTATE or PostgREST error code (e.g. "23505", "PGRST204")
        code: Option<String>,
        message: String,
        details: Option<String>,
    },
}

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl StoreError {
    /// Build an API error from a status code and raw response body.
    ///
    /// Bodies that are not PostgREST error JSON are kept verbatim as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => {
                let mut message = parsed
                    .message
                    .unwrap_or_else(|| "no error message".to_string());
                if let Some(hint) = parsed.hint.filter(|h| !h.is_empty()) {
                    message = format!("{} (hint: {})", message, hint);
                }
                StoreError::Api {
                    status,
                    code: parsed.code,
                    message,
                    details: parsed.details,
                }
            }
            Err(_) => StoreError::Api {
                status,
                code: None,
                message: if body.trim().is_empty() {
                    "no error message".to_string()
                } else {
                    body.trim().to_string()
                },
                details: None,
            },
        }
    }

    /// Unique-key violation: SQLSTATE 23505 or a "duplicate key" message
    pub fn is_duplicate_key(&self) -> bool {
        if let StoreError::Api {
            code: Some(code), ..
        } = self
        {
            if code == UNIQUE_VIOLATION {
                return true;
            }
        }
        self.to_string().to_lowercase().contains("duplicate key")
    }

    /// Whether the same request could succeed if sent again.
    ///
    /// Transport failures, rate limiting and server errors qualify; anything the
    /// database rejected (constraints, bad columns) does not.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Transport { .. } => true,
            StoreError::Api { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Transport { message } => write!(f, "request failed: {}", message),
            StoreError::Api {
                status,
                code,
                message,
                details,
            } => {
                write!(f, "{}", message)?;
                match code {
                    Some(code) => write!(f, " (code {}, HTTP {})", code, status)?,
                    None => write!(f, " (HTTP {})", status)?,
                }
                if let Some(details) = details.as_deref().filter(|d| !d.is_empty()) {
                    write!(f, ": {}", details)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_postgrest_body() {
        let body = r#"{"code":"23505","details":"Key (sku)=(A1) already exists.","hint":null,"message":"duplicate key value violates unique constraint \"coatings_sku_key\""}"#;
        let err = StoreError::from_response(409, body);

        assert!(err.is_duplicate_key());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "duplicate key value violates unique constraint \"coatings_sku_key\" (code 23505, HTTP 409): Key (sku)=(A1) already exists."
        );
    }

    #[test]
    fn test_duplicate_detected_from_message_alone() {
        let err = StoreError::from_response(400, "ERROR: Duplicate Key found");
        assert!(err.is_duplicate_key());
    }

    #[test]
    fn test_other_errors_not_duplicates() {
        let body = r#"{"code":"PGRST204","message":"Could not find the 'colour' column of 'coatings' in the schema cache","details":null,"hint":null}"#;
        let err = StoreError::from_response(400, body);
        assert!(!err.is_duplicate_key());
        match err {
            StoreError::Api { code, .. } => assert_eq!(code.as_deref(), Some("PGRST204")),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_body() {
        let err = StoreError::from_response(503, "");
        assert_eq!(err.to_string(), "no error message (HTTP 503)");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_transport_retryable() {
        let err = StoreError::Transport {
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!err.is_duplicate_key());
    }
}
