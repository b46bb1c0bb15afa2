//! Request body sent to the chat-completions endpoint.

use crate::dtos::GenerationRequest;
use serde::Serialize;

pub const DEFAULT_ASPECT_RATIO: &str = "16:9";

/// Message content used when the caller supplied nothing to describe.
pub const PROMPT_PLACEHOLDER: &str = "Generate an image.";

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub modalities: Vec<Modality>,
    pub image_config: ImageConfig,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Text,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

impl UpstreamPayload {
    pub fn new(model: &str, request: &GenerationRequest) -> Self {
        let aspect_ratio = if request.aspect.is_empty() {
            DEFAULT_ASPECT_RATIO.to_string()
        } else {
            request.aspect.clone()
        };

        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: compose_prompt(request),
            }],
            modalities: vec![Modality::Image, Modality::Text],
            image_config: ImageConfig { aspect_ratio },
        }
    }
}

/// Join the prompt, style and quality into one message, blank-line separated.
pub fn compose_prompt(request: &GenerationRequest) -> String {
    let mut parts = Vec::with_capacity(3);
    if !request.prompt.is_empty() {
        parts.push(request.prompt.clone());
    }
    if !request.style.is_empty() {
        parts.push(format!("Style: {}", request.style));
    }
    if !request.quality.is_empty() {
        parts.push(format!("Quality: {}", request.quality));
    }

    if parts.is_empty() {
        PROMPT_PLACEHOLDER.to_string()
    } else {
        parts.join("\n\n")
    }
}

/// Chat-completions URL for a configured base URL.
///
/// A base that already names the endpoint is used verbatim; otherwise one
/// trailing slash is dropped before the path is appended.
pub fn resolve_endpoint(base_url: &str) -> String {
    if base_url.ends_with(CHAT_COMPLETIONS_PATH) {
        return base_url.to_string();
    }

    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{}{}", base, CHAT_COMPLETIONS_PATH)
}
