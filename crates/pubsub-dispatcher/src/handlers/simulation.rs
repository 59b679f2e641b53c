//! Simulation handler

use uuid::Uuid;

use pubsub_dispatcher_sdk::prelude::*;

use crate::publisher::ResponsePublisher;

/// Echoes `simulate` messages back under a fresh simulation id
#[derive(Debug, Clone)]
pub struct SimulationHandler {
    publisher: ResponsePublisher,
}

impl SimulationHandler {
    pub fn new(publisher: ResponsePublisher) -> Self {
        Self { publisher }
    }

    pub async fn handle(&self, msg: &LogicalMessage) -> DispatchResult {
        let simulation_id = Uuid::new_v4().to_string();
        tracing::info!(simulation_id = %simulation_id, "Processing simulation message");

        let payload = ResponsePayload::success(
            "Simulation processed successfully",
            PayloadDetails::Simulation {
                original_data: msg.to_value(),
                simulation_id,
            },
        );
        self.publisher.send_response(payload).await;

        DispatchResult::simulation()
    }
}
