//! Logical messages, response payloads and dispatch results

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::DispatchError;

/// Current UTC time as an ISO-8601 string with second precision.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Handler selector carried in the `action` field of a logical message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    HelloWorld,
    Simulate,
    /// Anything else, rendered the way it appears in the unknown-action error
    Unknown(String),
}

impl Action {
    /// Resolve the action from the raw `action` field (case-sensitive).
    ///
    /// A missing or null field renders as an empty string; non-string values
    /// render as their JSON text.
    pub fn from_field(field: Option<&Value>) -> Self {
        match field {
            Some(Value::String(s)) if s == "hello_world" => Action::HelloWorld,
            Some(Value::String(s)) if s == "simulate" => Action::Simulate,
            Some(Value::String(s)) => Action::Unknown(s.clone()),
            None | Some(Value::Null) => Action::Unknown(String::new()),
            Some(other) => Action::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::HelloWorld => write!(f, "hello_world"),
            Action::Simulate => write!(f, "simulate"),
            Action::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// The decoded application payload handlers operate on
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalMessage {
    action: Action,
    fields: Map<String, Value>,
}

impl LogicalMessage {
    /// Build a logical message from a decoded JSON value.
    ///
    /// Only JSON objects carry an action; anything else is a decode failure.
    pub fn from_value(value: Value) -> Result<Self, DispatchError> {
        match value {
            Value::Object(fields) => Ok(Self {
                action: Action::from_field(fields.get("action")),
                fields,
            }),
            other => Err(DispatchError::Decode(format!(
                "message must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Look up a field; absent fields read as `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field value, or JSON null when absent.
    pub fn field_or_null(&self, key: &str) -> Value {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }

    /// A copy of the whole message as JSON.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Handler-specific part of a [`ResponsePayload`]
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PayloadDetails {
    HelloWorld {
        original_message: Value,
        original_message_number: Value,
        thread_id: Value,
        processing_time_ms: u32,
    },
    Simulation {
        original_data: Value,
        simulation_id: String,
    },
}

/// Message a handler publishes to the output topic
#[derive(Debug, Clone, Serialize)]
pub struct ResponsePayload {
    pub message: String,
    #[serde(flatten)]
    pub details: PayloadDetails,
    pub processed_at: String,
    pub status: String,

    /// Broker-assigned id, set after a successful publish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message_id: Option<String>,

    /// Failure description, set after a failed publish
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_error: Option<String>,
}

impl ResponsePayload {
    /// Create a `status: "success"` payload stamped with the current time
    pub fn success(message: impl Into<String>, details: PayloadDetails) -> Self {
        Self {
            message: message.into(),
            details,
            processed_at: timestamp(),
            status: "success".to_string(),
            response_message_id: None,
            response_error: None,
        }
    }

    pub fn record_published(&mut self, message_id: impl Into<String>) {
        self.response_message_id = Some(message_id.into());
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.response_error = Some(error.into());
    }
}

/// Value returned to the HTTP caller after dispatch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DispatchResult {
    HelloWorld {
        status: String,
        message_number: Value,
        processed_at: String,
        response_sent: bool,
    },
    Simulation {
        status: String,
        simulation_processed: bool,
        processed_at: String,
    },
    UnknownAction {
        error: String,
    },
}

impl DispatchResult {
    /// Hello-world outcome.
    ///
    /// `response_sent` is always true: a publish failure is only visible on
    /// the published payload, never here.
    pub fn hello_world(message_number: Value) -> Self {
        DispatchResult::HelloWorld {
            status: "success".to_string(),
            message_number,
            processed_at: timestamp(),
            response_sent: true,
        }
    }

    pub fn simulation() -> Self {
        DispatchResult::Simulation {
            status: "success".to_string(),
            simulation_processed: true,
            processed_at: timestamp(),
        }
    }

    pub fn unknown_action(action: &Action) -> Self {
        DispatchResult::UnknownAction {
            error: format!("Unknown action: {}", action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_resolution() {
        assert_eq!(Action::from_field(Some(&json!("hello_world"))), Action::HelloWorld);
        assert_eq!(Action::from_field(Some(&json!("simulate"))), Action::Simulate);
        assert_eq!(
            Action::from_field(Some(&json!("Simulate"))),
            Action::Unknown("Simulate".to_string())
        );
        assert_eq!(Action::from_field(None), Action::Unknown(String::new()));
        assert_eq!(Action::from_field(Some(&json!(7))), Action::Unknown("7".to_string()));
    }

    #[test]
    fn test_logical_message_requires_object() {
        let msg = LogicalMessage::from_value(json!({"action": "simulate", "foo": "bar"})).unwrap();
        assert_eq!(msg.action(), &Action::Simulate);
        assert_eq!(msg.get("foo"), Some(&json!("bar")));
        assert_eq!(msg.field_or_null("missing"), Value::Null);

        let err = LogicalMessage::from_value(json!([1, 2])).unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[test]
    fn test_payload_serialization() {
        let mut payload = ResponsePayload::success(
            "Simulation processed successfully",
            PayloadDetails::Simulation {
                original_data: json!({"foo": "bar"}),
                simulation_id: "abc".to_string(),
            },
        );
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["original_data"], json!({"foo": "bar"}));
        assert_eq!(value["status"], "success");
        assert!(value.get("response_message_id").is_none());

        payload.record_published("42");
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["response_message_id"], "42");
    }

    #[test]
    fn test_unknown_action_result() {
        let result = DispatchResult::unknown_action(&Action::Unknown("unknown_action".to_string()));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"error": "Unknown action: unknown_action"})
        );

        let missing = DispatchResult::unknown_action(&Action::from_field(None));
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            json!({"error": "Unknown action: "})
        );
    }

    #[test]
    fn test_timestamp_is_utc_seconds() {
        let ts = timestamp();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
        assert!(!ts.contains('.'));
    }
}
