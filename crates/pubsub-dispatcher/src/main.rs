//! Pub/Sub Dispatcher - Main entry point
//!
//! This is the push endpoint that:
//! - Receives Pub/Sub push deliveries (or raw JSON messages) over HTTP
//! - Routes them by `action` to the hello-world or simulation handler
//! - Publishes each handler's reply to the configured output topic

mod config;
mod dispatcher;
mod handlers;
mod publisher;
mod router;

use anyhow::{Context, Result};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::dispatcher::Dispatcher;
use crate::publisher::PubSubRestClient;

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: Dispatcher,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info,pubsub_dispatcher=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pub/Sub Dispatcher");

    // Load configuration
    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!("Configuration loaded: {:?}", config.redacted());

    let topic = config.topic_path()?;
    let client = PubSubRestClient::from_config(&config)
        .context("Failed to build Pub/Sub client")?;
    tracing::info!(topic = %topic, endpoint = %config.pubsub_endpoint, "Publishing responses to {}", topic);

    let dispatcher = Dispatcher::with_client(Arc::new(client), topic, config.processing_delay);

    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState { config, dispatcher });

    let app = router::create_push_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Push endpoint listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Pub/Sub Dispatcher stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
