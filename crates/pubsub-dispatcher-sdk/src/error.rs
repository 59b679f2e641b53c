//! Error types for the dispatcher

use thiserror::Error;

use crate::message::timestamp;

/// Errors that abort a dispatch and surface at the HTTP boundary.
///
/// An unknown action is not an error; it is a [`crate::DispatchResult`].
/// Publish failures never reach this type either, they are recorded on the
/// outgoing payload instead.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DispatchError {
    /// Convert the error to an HTTP status code
    pub fn status_code(&self) -> u16 {
        // Every failure that escapes dispatch is a processing failure
        500
    }

    /// Convert to a `{error, timestamp}` Response
    pub fn to_response(&self) -> crate::Response {
        crate::Response::json(
            self.status_code(),
            serde_json::json!({
                "error": self.to_string(),
                "timestamp": timestamp(),
            }),
        )
    }
}

impl From<DispatchError> for crate::Response {
    fn from(err: DispatchError) -> Self {
        err.to_response()
    }
}
