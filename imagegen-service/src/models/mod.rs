pub mod image;
pub mod payload;

pub use image::{extract_image_url, normalize_image_url, MissingImage};
pub use payload::{compose_prompt, resolve_endpoint, UpstreamPayload};
