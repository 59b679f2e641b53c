//! HTTP Request representation for the push endpoint

use crate::error::DispatchError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents an incoming push delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// HTTP method (normally POST)
    pub method: String,

    /// Request path the function was invoked on
    pub path: String,

    /// HTTP headers
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Raw request body
    #[serde(default)]
    pub body: Option<String>,

    /// Request ID for tracing
    #[serde(default)]
    pub request_id: String,
}

impl Request {
    /// Parse the body as JSON.
    ///
    /// A missing body parses as `null`, which the dispatcher then rejects as
    /// not being a message object.
    ///
    /// # Example
    /// ```ignore
    /// let raw: JsonValue = req.json()?;
    /// ```
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, DispatchError> {
        let body = self.body.as_deref().unwrap_or("null");
        Ok(serde_json::from_str(body)?)
    }

    /// Get a header value (case-insensitive lookup).
    pub fn header(&self, key: &str) -> Option<&String> {
        let key_lower = key.to_lowercase();
        self.headers.iter()
            .find(|(k, _)| k.to_lowercase() == key_lower)
            .map(|(_, v)| v)
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> Option<&String> {
        self.header("Content-Type")
    }
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: "POST".to_string(),
            path: "/".to_string(),
            headers: HashMap::new(),
            body: None,
            request_id: String::new(),
        }
    }
}
