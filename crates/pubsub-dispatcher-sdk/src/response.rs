//! HTTP Response representation for the push endpoint

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::message::timestamp;

/// Represents an outgoing HTTP response.
///
/// | Method | Status | Use Case |
/// |--------|--------|----------|
/// | `ok(body)` | 200 | Dispatch completed (including unknown actions) |
/// | `bad_request(msg)` | 400 | Body could not be read |
/// | `json(500, body)` | 500 | Dispatch failed, see `DispatchError::to_response` |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Response body
    #[serde(default)]
    pub body: Option<String>,
}

impl Response {
    /// Create a 200 OK response with JSON body.
    ///
    /// # Example
    /// ```ignore
    /// Response::ok(json!({"status": "success"}))
    /// Response::ok(dispatch_result)
    /// ```
    pub fn ok<T: Serialize>(body: T) -> Self {
        Self::json(200, body)
    }

    /// Create a JSON response with a custom status code.
    pub fn json<T: Serialize>(status: u16, body: T) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            status,
            headers,
            body: serde_json::to_string(&body).ok(),
        }
    }

    /// Create a 400 Bad Request response with `{error, timestamp}`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::json(400, serde_json::json!({"error": message.into(), "timestamp": timestamp()}))
    }

    /// Add a header to the response (builder pattern).
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}
