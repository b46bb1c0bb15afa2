pub mod metrics;
pub mod providers;

pub use providers::{ChatCompletionsProvider, ImageProvider};
