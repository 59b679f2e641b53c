//! Pub/Sub Dispatcher SDK - Types shared by the push endpoint and its handlers
//!
//! This crate holds everything that does not depend on the HTTP server or the
//! messaging client: the inbound request, push envelope decoding, the action
//! discriminator, the payloads handlers build, and the error type.

pub mod request;
pub mod response;
pub mod envelope;
pub mod message;
pub mod error;

pub mod prelude {
    //! Common imports for dispatcher handlers
    pub use crate::request::Request;
    pub use crate::response::Response;
    pub use crate::envelope::{Envelope, PushMessage};
    pub use crate::message::{timestamp, Action, DispatchResult, LogicalMessage, PayloadDetails, ResponsePayload};
    pub use crate::error::DispatchError;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value as JsonValue};
}

// Re-export key types at crate root
pub use request::Request;
pub use response::Response;
pub use envelope::Envelope;
pub use message::{Action, DispatchResult, LogicalMessage, PayloadDetails, ResponsePayload};
pub use error::DispatchError;
