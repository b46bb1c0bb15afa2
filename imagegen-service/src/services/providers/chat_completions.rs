//! Chat-completions provider.
//!
//! Posts the payload to `<base>/chat/completions` with a bearer token, the
//! request shape used by OpenRouter-style gateways for image models.

use super::{ImageProvider, ProviderError, UpstreamBody, UpstreamReply};
use crate::models::{resolve_endpoint, UpstreamPayload};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use secrecy::{ExposeSecret, SecretString};
use service_core::observability::TracedClientExt;

pub struct ChatCompletionsProvider {
    client: Client,
    endpoint: String,
    api_key: SecretString,
}

impl ChatCompletionsProvider {
    /// No client timeout is set; the platform default applies.
    pub fn new(base_url: &str, api_key: SecretString) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: resolve_endpoint(base_url),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageProvider for ChatCompletionsProvider {
    async fn generate(&self, payload: &UpstreamPayload) -> Result<UpstreamReply, ProviderError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %payload.model,
            aspect_ratio = %payload.image_config.aspect_ratio,
            "Sending request to image provider"
        );

        let response = self
            .client
            .traced_post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(payload)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        let body = if is_json {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ProviderError::Network(e.to_string()))?;
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| ProviderError::Decode(e.to_string()))?;
            UpstreamBody::Json(value)
        } else {
            let text = response
                .text()
                .await
                .map_err(|e| ProviderError::Decode(e.to_string()))?;
            UpstreamBody::Text(text)
        };

        Ok(UpstreamReply { status, body })
    }
}
