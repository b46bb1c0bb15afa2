pub mod generate;

pub use generate::{FormError, GenerateResponse, GenerationRequest};
