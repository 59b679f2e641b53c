//! Action handlers
//!
//! Each handler builds a [`pubsub_dispatcher_sdk::ResponsePayload`], hands it
//! to the [`crate::publisher::ResponsePublisher`] and returns the
//! [`pubsub_dispatcher_sdk::DispatchResult`] seen by the HTTP caller.

pub mod hello_world;
pub mod simulation;

pub use hello_world::HelloWorldHandler;
pub use simulation::SimulationHandler;

use serde_json::Value;

/// Render a field for embedding in human-readable text (null reads as empty)
pub(crate) fn display_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
