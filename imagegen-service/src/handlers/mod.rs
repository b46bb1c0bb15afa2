//! HTTP handlers for the image generation service.

pub mod generate;
pub mod health;

pub use generate::generate_image;
pub use health::{health_check, metrics};
