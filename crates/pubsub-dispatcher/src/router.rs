//! Push endpoint router - turns HTTP deliveries into dispatches
//!
//! The function may be mounted at any path, so every POST is a delivery.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use pubsub_dispatcher_sdk::DispatchError;

use crate::AppState;

/// Create the router that receives push deliveries
pub fn create_push_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/", post(handle_push_request))
        .route("/{*path}", post(handle_push_request))
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Handle one push delivery
async fn handle_push_request(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let headers: HashMap<String, String> = request.headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
        .collect();

    let request_id = headers.get("x-request-id")
        .filter(|id| !id.is_empty())
        .cloned()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Incoming push delivery"
    );

    let body_bytes = match axum::body::to_bytes(request.into_body(), state.config.max_body_bytes).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(request_id = %request_id, "Failed to read body: {}", e);
            let sdk_response = pubsub_dispatcher_sdk::Response::bad_request(format!("Failed to read body: {}", e))
                .with_header("X-Request-Id", request_id);
            return into_http_response(sdk_response);
        }
    };

    let body = if body_bytes.is_empty() {
        None
    } else {
        match String::from_utf8(body_bytes.to_vec()) {
            Ok(text) => Some(text),
            Err(e) => {
                let err = DispatchError::Decode(format!("request body is not valid UTF-8: {}", e));
                tracing::error!(request_id = %request_id, "Error processing request: {}", err);
                return into_http_response(err.to_response().with_header("X-Request-Id", request_id));
            }
        }
    };

    let sdk_request = pubsub_dispatcher_sdk::Request {
        method,
        path,
        headers,
        body,
        request_id: request_id.clone(),
    };

    if let Some(content_type) = sdk_request.content_type() {
        if !content_type.contains("json") {
            tracing::debug!(request_id = %request_id, content_type = %content_type, "Non-JSON content type, parsing anyway");
        }
    }

    let sdk_response = match state.dispatcher.dispatch(&sdk_request).await {
        Ok(result) => pubsub_dispatcher_sdk::Response::ok(result),
        Err(e) => {
            let response = e.to_response();
            tracing::error!(request_id = %request_id, "Error processing request: {:?}", anyhow::Error::new(e));
            response
        }
    };

    into_http_response(sdk_response.with_header("X-Request-Id", request_id))
}

fn into_http_response(sdk_response: pubsub_dispatcher_sdk::Response) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(sdk_response.status).unwrap_or(StatusCode::OK));

    for (key, value) in sdk_response.headers {
        builder = builder.header(&key, &value);
    }

    match builder.body(Body::from(sdk_response.body.unwrap_or_default())) {
        Ok(response) => response,
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to build response").into_response(),
    }
}
