//! Upstream image provider abstraction.
//!
//! The generate handler only talks to an `ImageProvider`, so the HTTP client
//! can be swapped for the mock in tests.

pub mod chat_completions;
pub mod mock;

pub use chat_completions::ChatCompletionsProvider;

use crate::models::UpstreamPayload;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Raw reply from the upstream, before any image lookup.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: UpstreamBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// Content type advertised JSON and the body parsed.
    Json(Value),

    /// Any other content type, kept verbatim.
    Text(String),
}

/// A backend able to run one image generation call.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Send the payload once. No retries.
    async fn generate(&self, payload: &UpstreamPayload) -> Result<UpstreamReply, ProviderError>;
}
