//! Google Cloud Pub/Sub REST client

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::{MessageClient, PublishError};
use crate::config::AppConfig;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Where the bearer token for a publish call comes from
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// No authentication (emulator)
    Anonymous,
    /// A fixed token supplied by configuration
    Static(String),
    /// Fetched from the instance metadata server on every publish
    Metadata { url: String },
}

#[derive(Serialize)]
struct PublishRequest {
    messages: Vec<OutboundMessage>,
}

#[derive(Serialize)]
struct OutboundMessage {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Pub/Sub client speaking the `topics.publish` REST call.
///
/// Built once at startup and shared; `reqwest::Client` pools connections
/// internally and is safe for concurrent use.
#[derive(Debug, Clone)]
pub struct PubSubRestClient {
    http: reqwest::Client,
    endpoint: String,
    tokens: TokenSource,
}

impl PubSubRestClient {
    pub fn new(endpoint: impl Into<String>, tokens: TokenSource) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, PublishError> {
        let tokens = if config.emulator {
            TokenSource::Anonymous
        } else if let Some(token) = &config.access_token {
            TokenSource::Static(token.clone())
        } else {
            TokenSource::Metadata {
                url: METADATA_TOKEN_URL.to_string(),
            }
        };
        Self::new(config.pubsub_endpoint.clone(), tokens)
    }

    async fn bearer_token(&self) -> Result<Option<String>, PublishError> {
        match &self.tokens {
            TokenSource::Anonymous => Ok(None),
            TokenSource::Static(token) => Ok(Some(token.clone())),
            TokenSource::Metadata { url } => {
                let response = self
                    .http
                    .get(url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| PublishError::Auth(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(PublishError::Auth(format!(
                        "metadata server returned {}",
                        response.status()
                    )));
                }

                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| PublishError::Auth(e.to_string()))?;
                Ok(Some(token.access_token))
            }
        }
    }
}

#[async_trait]
impl MessageClient for PubSubRestClient {
    async fn publish(&self, topic: &str, data: Bytes) -> Result<String, PublishError> {
        let url = format!("{}/v1/{}:publish", self.endpoint, topic);
        let body = PublishRequest {
            messages: vec![OutboundMessage {
                data: STANDARD.encode(&data),
            }],
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        tracing::debug!(topic = %topic, payload_size = data.len(), "Publishing message");

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply: PublishResponse = response.json().await?;
        reply
            .message_ids
            .into_iter()
            .next()
            .ok_or(PublishError::MissingMessageId)
    }
}
