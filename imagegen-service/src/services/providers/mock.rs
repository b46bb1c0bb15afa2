//! Mock provider for testing.

use super::{ImageProvider, ProviderError, UpstreamBody, UpstreamReply};
use crate::models::UpstreamPayload;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Mutex;

/// Replies with a canned result and remembers every payload it was sent.
pub struct MockImageProvider {
    reply: Result<UpstreamReply, String>,
    calls: Mutex<Vec<UpstreamPayload>>,
}

impl MockImageProvider {
    pub fn replying(status: StatusCode, body: UpstreamBody) -> Self {
        Self {
            reply: Ok(UpstreamReply { status, body }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<UpstreamPayload> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(&self, payload: &UpstreamPayload) -> Result<UpstreamReply, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(payload.clone());
        }

        self.reply
            .clone()
            .map_err(ProviderError::Network)
    }
}
