//! Application configuration

use std::env;
use std::time::Duration;

const DEFAULT_PUBSUB_ENDPOINT: &str = "https://pubsub.googleapis.com";

/// Errors raised while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Topic '{0}' is not fully qualified and no project is configured (set GOOGLE_CLOUD_PROJECT)")]
    MissingProject(String),
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Output topic, short name or `projects/<project>/topics/<topic>`
    pub response_topic: String,

    /// Project used to qualify a short topic name
    pub project_id: Option<String>,

    /// Port for the push endpoint
    pub port: u16,

    /// Pub/Sub REST endpoint
    pub pubsub_endpoint: String,

    /// Whether the endpoint is a local emulator (no auth)
    pub emulator: bool,

    /// Static bearer token for the Pub/Sub API
    pub access_token: Option<String>,

    /// Synthetic processing delay of the hello-world handler
    pub processing_delay: Duration,

    /// Maximum accepted request body in bytes
    pub max_body_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let response_topic = non_empty("RESPONSE_TOPIC_NAME")
            .ok_or(ConfigError::MissingVar("RESPONSE_TOPIC_NAME"))?;

        let project_id = non_empty("GOOGLE_CLOUD_PROJECT").or_else(|| non_empty("GCP_PROJECT"));

        let emulator_host = non_empty("PUBSUB_EMULATOR_HOST");
        let emulator = emulator_host.is_some();
        let pubsub_endpoint = match emulator_host {
            Some(host) => format!("http://{}", host),
            None => non_empty("PUBSUB_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_PUBSUB_ENDPOINT.to_string()),
        };

        let config = Self {
            response_topic,
            project_id,
            port: non_empty("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            pubsub_endpoint: pubsub_endpoint.trim_end_matches('/').to_string(),
            emulator,
            access_token: non_empty("PUBSUB_ACCESS_TOKEN"),
            processing_delay: Duration::from_millis(
                non_empty("DISPATCHER_PROCESSING_DELAY_MS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
            max_body_bytes: non_empty("DISPATCHER_MAX_BODY_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
        };

        // Fail at startup rather than on the first publish
        config.topic_path()?;
        Ok(config)
    }

    /// Fully qualified topic path (`projects/<project>/topics/<topic>`)
    pub fn topic_path(&self) -> Result<String, ConfigError> {
        if self.response_topic.starts_with("projects/") {
            return Ok(self.response_topic.clone());
        }
        match &self.project_id {
            Some(project) => Ok(format!("projects/{}/topics/{}", project, self.response_topic)),
            None => Err(ConfigError::MissingProject(self.response_topic.clone())),
        }
    }
}

impl AppConfig {
    /// Copy safe for logging
    pub fn redacted(&self) -> Self {
        Self {
            access_token: self.access_token.as_ref().map(|_| "<redacted>".to_string()),
            ..self.clone()
        }
    }
}
