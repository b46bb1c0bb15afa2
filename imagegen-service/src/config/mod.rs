use secrecy::SecretString;
use service_core::config::{self as core_config, optional_env};
use service_core::error::AppError;

/// Model used when `AI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct ImagegenConfig {
    pub common: core_config::Config,
    pub ai: AiConfig,
}

/// Upstream provider settings.
///
/// Base URL and API key stay optional at startup: a service without them still
/// boots and answers every generate request with a configuration error.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub model: String,
}

impl ImagegenConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        Ok(ImagegenConfig {
            common: common_config,
            ai: AiConfig::from_lookup(optional_env),
        })
    }
}

impl AiConfig {
    /// Build from a key lookup that already treats empty values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup("AI_BASE_URL"),
            api_key: lookup("AI_API_KEY").map(SecretString::new),
            model: lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Base URL and API key, when both are present.
    pub fn credentials(&self) -> Option<(&str, &SecretString)> {
        match (&self.base_url, &self.api_key) {
            (Some(base_url), Some(api_key)) => Some((base_url.as_str(), api_key)),
            _ => None,
        }
    }
}
