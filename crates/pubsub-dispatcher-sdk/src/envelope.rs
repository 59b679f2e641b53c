//! Push envelope decoding
//!
//! A push delivery body is either the logical message itself
//! (`{"action": ...}`) or a Pub/Sub push envelope
//! (`{"message": {"data": ..., "messageId": ...}, "subscription": ...}`).
//! `data` is normally base64-encoded JSON, but a plain JSON string or an
//! already structured value is accepted too.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::DispatchError;
use crate::message::LogicalMessage;

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Delivery metadata of a push envelope, used for logging only
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushMessage {
    #[serde(default, rename = "messageId")]
    pub message_id: Option<String>,

    #[serde(default, rename = "publishTime")]
    pub publish_time: Option<String>,

    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// A parsed request body, before envelope extraction
#[derive(Debug, Clone)]
pub struct Envelope {
    raw: Value,
}

impl Envelope {
    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    /// Whether the body carries a usable `message.data` field
    pub fn is_wrapped(&self) -> bool {
        self.data().is_some()
    }

    /// Push delivery metadata, when the body is shaped like a push envelope
    pub fn push_message(&self) -> Option<PushMessage> {
        if !self.is_wrapped() {
            return None;
        }
        self.raw
            .get("message")
            .and_then(|m| serde_json::from_value(m.clone()).ok())
    }

    pub fn subscription(&self) -> Option<&str> {
        self.raw.get("subscription").and_then(Value::as_str)
    }

    /// Extract the logical message.
    ///
    /// - string `message.data`: base64-decode then parse; on failure parse the string itself
    /// - structured `message.data`: used as-is
    /// - no `message.data`: the whole body is the message
    pub fn into_message(self) -> Result<LogicalMessage, DispatchError> {
        let unwrapped = match self.data() {
            Some(Value::String(data)) => Some(decode_data(data)?),
            Some(structured) => Some(structured.clone()),
            None => None,
        };
        LogicalMessage::from_value(unwrapped.unwrap_or(self.raw))
    }

    /// `message.data`, treating null and `false` as absent
    fn data(&self) -> Option<&Value> {
        self.raw
            .get("message")
            .and_then(|m| m.get("data"))
            .filter(|d| !matches!(d, Value::Null | Value::Bool(false)))
    }
}

/// Decode a string `data` field: base64 JSON first, then the string as JSON.
fn decode_data(data: &str) -> Result<Value, DispatchError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let from_base64 = LENIENT_BASE64
        .decode(compact.as_bytes())
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok());

    match from_base64 {
        Some(value) => Ok(value),
        None => serde_json::from_str(data).map_err(|e| {
            DispatchError::Decode(format!("message.data is neither base64 JSON nor JSON: {}", e))
        }),
    }
}
