//! Locating and normalising the image reference in an upstream reply.

use serde_json::Value;
use thiserror::Error;

const BASE64_PNG_PREFIX: &str = "data:image/png;base64,";

/// The step at which the image lookup came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingImage {
    #[error("response has no choices")]
    NoChoices,

    #[error("first choice has no message")]
    NoMessage,

    #[error("message has no images")]
    NoImages,

    #[error("first image has no url")]
    NoUrl,
}

/// Walk `choices[0].message.images[0].image_url.url`.
///
/// Structural mismatches never fail the request; they only say where the
/// lookup stopped. An empty or non-string url counts as missing.
pub fn extract_image_url(body: &Value) -> Result<String, MissingImage> {
    let choice = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or(MissingImage::NoChoices)?;

    let message = choice.get("message").ok_or(MissingImage::NoMessage)?;

    let image = message
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .ok_or(MissingImage::NoImages)?;

    image
        .get("image_url")
        .and_then(|image_url| image_url.get("url"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .ok_or(MissingImage::NoUrl)
}

/// Data URLs and absolute http(s) URLs pass through; anything else is taken to
/// be a bare base64 PNG payload.
pub fn normalize_image_url(url: String) -> String {
    if url.starts_with("data:") || is_absolute_http_url(&url) {
        url
    } else {
        format!("{}{}", BASE64_PNG_PREFIX, url)
    }
}

fn is_absolute_http_url(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
