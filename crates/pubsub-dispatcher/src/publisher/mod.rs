//! Response publishing
//!
//! [`ResponsePublisher`] makes one best-effort publish of a handler's payload
//! to the configured output topic. The transport sits behind the
//! [`MessageClient`] trait so the dispatcher can run against a fake.

pub mod pubsub;

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use pubsub_dispatcher_sdk::ResponsePayload;

pub use pubsub::PubSubRestClient;

/// Errors from the messaging client
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Publish rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to obtain access token: {0}")]
    Auth(String),

    #[error("Publish response carried no message id")]
    MissingMessageId,

    #[error("Failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Publish capability of a messaging backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageClient: Send + Sync {
    /// Publish one message and return the broker-assigned message id
    async fn publish(&self, topic: &str, data: Bytes) -> Result<String, PublishError>;
}

/// Publishes handler payloads to the output topic
#[derive(Clone)]
pub struct ResponsePublisher {
    client: Arc<dyn MessageClient>,
    topic: String,
}

impl ResponsePublisher {
    pub fn new(client: Arc<dyn MessageClient>, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }

    /// Publish `payload` and record the outcome on it.
    ///
    /// Success sets `response_message_id`, failure sets `response_error`.
    /// Failures are logged and never returned.
    pub async fn send_response(&self, mut payload: ResponsePayload) -> ResponsePayload {
        match self.publish(&payload).await {
            Ok(message_id) => {
                tracing::info!(
                    topic = %self.topic,
                    message_id = %message_id,
                    "Response sent to topic {}: {}", self.topic, message_id
                );
                payload.record_published(message_id);
            }
            Err(e) => {
                tracing::error!(topic = %self.topic, "Failed to send response: {}", e);
                payload.record_failure(e.to_string());
            }
        }
        payload
    }

    async fn publish(&self, payload: &ResponsePayload) -> Result<String, PublishError> {
        let data = serde_json::to_vec(payload)?;
        self.client.publish(&self.topic, Bytes::from(data)).await
    }
}

impl std::fmt::Debug for ResponsePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponsePublisher")
            .field("topic", &self.topic)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use pubsub_dispatcher_sdk::PayloadDetails;
    use serde_json::json;

    fn payload() -> ResponsePayload {
        ResponsePayload::success(
            "Simulation processed successfully",
            PayloadDetails::Simulation {
                original_data: json!({"foo": "bar"}),
                simulation_id: "sim-1".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_success_records_message_id() {
        let mut client = MockMessageClient::new();
        client
            .expect_publish()
            .with(eq("projects/p/topics/out"), mockall::predicate::always())
            .times(1)
            .returning(|_, data| {
                let sent: serde_json::Value = serde_json::from_slice(&data).unwrap();
                assert_eq!(sent["simulation_id"], "sim-1");
                assert!(sent.get("response_message_id").is_none());
                Ok("1001".to_string())
            });

        let publisher = ResponsePublisher::new(Arc::new(client), "projects/p/topics/out");
        let result = publisher.send_response(payload()).await;

        assert_eq!(result.response_message_id.as_deref(), Some("1001"));
        assert!(result.response_error.is_none());
    }

    #[tokio::test]
    async fn test_failure_is_recorded_not_raised() {
        let mut client = MockMessageClient::new();
        client.expect_publish().times(1).returning(|_, _| {
            Err(PublishError::Rejected {
                status: 403,
                body: "permission denied".to_string(),
            })
        });

        let publisher = ResponsePublisher::new(Arc::new(client), "projects/p/topics/out");
        let result = publisher.send_response(payload()).await;

        assert!(result.response_message_id.is_none());
        let error = result.response_error.unwrap();
        assert!(error.contains("403"));
        assert!(error.contains("permission denied"));
    }
}
