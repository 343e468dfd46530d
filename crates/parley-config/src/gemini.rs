use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Model used when the configuration does not name one
pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";

/// Gemini backend configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key for the Generative Language API
    pub api_key: SecretString,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Model identifier, e.g. `models/gemini-2.5-pro`
    #[serde(default = "default_model")]
    pub model: String,
    /// Connect and idle read timeout (e.g. "30s", "2m")
    #[serde(default)]
    pub timeout: Option<String>,
}

impl GeminiConfig {
    /// Configuration with only an API key set
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: None,
            model: default_model(),
            timeout: None,
        }
    }

    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout string is not a valid duration
    pub fn timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|s| duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid gemini.timeout '{s}': {e}")))
            .transpose()
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}
