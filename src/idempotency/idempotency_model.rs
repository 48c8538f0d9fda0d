use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::{Error, Result};

/// Response captured for replay: the HTTP status class plus the JSON body,
/// stored verbatim so a retried request observes exactly what the first one
/// did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResponse {
    pub status_code: u16,
    pub body: Value,
}

impl CachedResponse {
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    /// Shapes a service result the way the API layer responds: the serialized
    /// payload on success, `{"error": ...}` with the mapped status otherwise.
    pub fn from_result<T: Serialize>(result: &Result<T>, success_status: u16) -> Self {
        match result {
            Ok(payload) => Self {
                status_code: success_status,
                body: serde_json::to_value(payload).unwrap_or(Value::Null),
            },
            Err(error) => Self::from_error(error),
        }
    }

    pub fn from_error(error: &Error) -> Self {
        Self {
            status_code: error.status_code(),
            body: json!({ "error": error.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// One cached mutation response, kept for 24 hours.
#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub response: CachedResponse,
    pub stored_at: DateTime<Utc>,
}
