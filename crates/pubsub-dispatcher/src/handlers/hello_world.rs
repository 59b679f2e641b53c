//! Hello-world handler

use rand::Rng;
use serde_json::Value;
use std::time::Duration;

use pubsub_dispatcher_sdk::prelude::*;

use super::display_field;
use crate::publisher::ResponsePublisher;

/// Answers `hello_world` messages after a fixed processing delay
#[derive(Debug, Clone)]
pub struct HelloWorldHandler {
    publisher: ResponsePublisher,
    processing_delay: Duration,
}

impl HelloWorldHandler {
    pub fn new(publisher: ResponsePublisher, processing_delay: Duration) -> Self {
        Self {
            publisher,
            processing_delay,
        }
    }

    pub async fn handle(&self, msg: &LogicalMessage) -> DispatchResult {
        let message_number = msg.field_or_null("message_number");
        let original_message = msg.field_or_null("message");
        let label = display_field(&message_number);

        tracing::info!(message_number = %label, "Processing Hello World message {}", label);

        // Simulated work; sleeping keeps other invocations running
        tokio::time::sleep(self.processing_delay).await;
        tracing::debug!(
            delay = ?self.processing_delay,
            "Finished simulated processing for message {}", label
        );

        let thread_id = match msg.get("thread_id") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => Value::from("unknown"),
            Some(value) => value.clone(),
        };
        let processing_time_ms = rand::thread_rng().gen_range(50..=200);

        let payload = ResponsePayload::success(
            format!("Hello back from cloud function! Processed message {}", label),
            PayloadDetails::HelloWorld {
                original_message,
                original_message_number: message_number.clone(),
                thread_id,
                processing_time_ms,
            },
        );

        // The publish outcome is recorded on the payload only
        self.publisher.send_response(payload).await;

        DispatchResult::hello_world(message_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{MockMessageClient, PublishError};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn handler(client: MockMessageClient) -> HelloWorldHandler {
        let publisher = ResponsePublisher::new(Arc::new(client), "projects/p/topics/out");
        HelloWorldHandler::new(publisher, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_hello_world_publishes_reply() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let captured = sent.clone();

        let mut client = MockMessageClient::new();
        client.expect_publish().times(1).returning(move |_, data| {
            captured.lock().unwrap().push(serde_json::from_slice::<Value>(&data).unwrap());
            Ok("m-1".to_string())
        });

        let msg = LogicalMessage::from_value(json!({
            "action": "hello_world",
            "message_number": 5,
            "message": "hi",
            "thread_id": "t1"
        }))
        .unwrap();

        let result = handler(client).handle(&msg).await;
        match result {
            DispatchResult::HelloWorld { status, message_number, response_sent, .. } => {
                assert_eq!(status, "success");
                assert_eq!(message_number, json!(5));
                assert!(response_sent);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let payload = &sent[0];
        assert_eq!(payload["message"], "Hello back from cloud function! Processed message 5");
        assert_eq!(payload["original_message"], "hi");
        assert_eq!(payload["original_message_number"], 5);
        assert_eq!(payload["thread_id"], "t1");
        assert_eq!(payload["status"], "success");
        let ms = payload["processing_time_ms"].as_u64().unwrap();
        assert!((50..=200).contains(&ms));
    }

    #[tokio::test]
    async fn test_missing_fields_default() {
        let sent = Arc::new(Mutex::new(None));
        let captured = sent.clone();

        let mut client = MockMessageClient::new();
        client.expect_publish().times(1).returning(move |_, data| {
            *captured.lock().unwrap() = Some(serde_json::from_slice::<Value>(&data).unwrap());
            Ok("m-2".to_string())
        });

        let msg = LogicalMessage::from_value(json!({"action": "hello_world"})).unwrap();
        let result = handler(client).handle(&msg).await;
        assert!(matches!(
            result,
            DispatchResult::HelloWorld { ref message_number, .. } if message_number.is_null()
        ));

        let payload = sent.lock().unwrap().take().unwrap();
        assert_eq!(payload["thread_id"], "unknown");
        assert!(payload["original_message"].is_null());
        assert!(payload["original_message_number"].is_null());
    }

    async fn published_thread_id(thread_id: Value) -> Value {
        let sent = Arc::new(Mutex::new(None));
        let captured = sent.clone();

        let mut client = MockMessageClient::new();
        client.expect_publish().times(1).returning(move |_, data| {
            *captured.lock().unwrap() = Some(serde_json::from_slice::<Value>(&data).unwrap());
            Ok("m-4".to_string())
        });

        let msg = LogicalMessage::from_value(json!({"action": "hello_world", "thread_id": thread_id}))
            .unwrap();
        handler(client).handle(&msg).await;

        let payload = sent.lock().unwrap().take().unwrap();
        payload["thread_id"].clone()
    }

    #[tokio::test]
    async fn test_thread_id_is_copied_unchanged() {
        assert_eq!(published_thread_id(json!(42)).await, json!(42));
        assert_eq!(published_thread_id(json!({"a": 1})).await, json!({"a": 1}));
        assert_eq!(published_thread_id(json!("t9")).await, json!("t9"));
    }

    #[tokio::test]
    async fn test_false_thread_id_reads_as_unknown() {
        assert_eq!(published_thread_id(json!(false)).await, json!("unknown"));
        assert_eq!(published_thread_id(Value::Null).await, json!("unknown"));
    }

    #[tokio::test]
    async fn test_publish_failure_still_reports_sent() {
        let mut client = MockMessageClient::new();
        client
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(PublishError::Auth("no credentials".to_string())));

        let msg = LogicalMessage::from_value(json!({"action": "hello_world", "message_number": 1}))
            .unwrap();
        let result = handler(client).handle(&msg).await;
        assert!(matches!(result, DispatchResult::HelloWorld { response_sent: true, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_processing_delay_is_applied() {
        let mut client = MockMessageClient::new();
        client.expect_publish().returning(|_, _| Ok("m-3".to_string()));

        let publisher = ResponsePublisher::new(Arc::new(client), "projects/p/topics/out");
        let handler = HelloWorldHandler::new(publisher, Duration::from_secs(5));
        let msg = LogicalMessage::from_value(json!({"action": "hello_world"})).unwrap();

        let started = tokio::time::Instant::now();
        handler.handle(&msg).await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
