//! Message dispatcher - decodes a push body and routes it by action

use std::sync::Arc;
use std::time::Duration;

use pubsub_dispatcher_sdk::{Action, DispatchError, DispatchResult, Envelope, Request};

use crate::handlers::{HelloWorldHandler, SimulationHandler};
use crate::publisher::{MessageClient, ResponsePublisher};

/// Routes decoded messages to the hello-world and simulation handlers
#[derive(Debug, Clone)]
pub struct Dispatcher {
    hello_world: HelloWorldHandler,
    simulation: SimulationHandler,
}

impl Dispatcher {
    pub fn new(hello_world: HelloWorldHandler, simulation: SimulationHandler) -> Self {
        Self {
            hello_world,
            simulation,
        }
    }

    /// Wire both handlers to one shared publisher
    pub fn with_client(
        client: Arc<dyn MessageClient>,
        topic: impl Into<String>,
        processing_delay: Duration,
    ) -> Self {
        let publisher = ResponsePublisher::new(client, topic);
        Self::new(
            HelloWorldHandler::new(publisher.clone(), processing_delay),
            SimulationHandler::new(publisher),
        )
    }

    /// Decode the request body and run the matching handler.
    ///
    /// Malformed bodies and undecodable envelopes are errors; an unknown or
    /// missing action is a normal [`DispatchResult::UnknownAction`] and
    /// publishes nothing.
    pub async fn dispatch(&self, req: &Request) -> Result<DispatchResult, DispatchError> {
        tracing::info!(
            request_id = %req.request_id,
            "Received request body: {}", req.body.as_deref().unwrap_or_default()
        );

        let envelope = Envelope::from_value(req.json()?);
        if let Some(push) = envelope.push_message() {
            tracing::debug!(
                request_id = %req.request_id,
                message_id = push.message_id.as_deref().unwrap_or("-"),
                publish_time = push.publish_time.as_deref().unwrap_or("-"),
                subscription = envelope.subscription().unwrap_or("-"),
                "Unwrapping push envelope"
            );
        }

        let message = envelope.into_message()?;
        tracing::info!(
            request_id = %req.request_id,
            action = %message.action(),
            "Processing message: {}", message.to_value()
        );

        let result = match message.action() {
            Action::HelloWorld => self.hello_world.handle(&message).await,
            Action::Simulate => self.simulation.handle(&message).await,
            Action::Unknown(raw) => {
                tracing::warn!(request_id = %req.request_id, action = %raw, "Unknown action");
                DispatchResult::unknown_action(message.action())
            }
        };

        Ok(result)
    }
}
