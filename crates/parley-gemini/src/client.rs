use std::sync::Arc;
use std::time::Duration;

use parley_config::GeminiConfig;
use secrecy::SecretString;
use url::Url;

use crate::backend::{Backend, HttpBackend};
use crate::chat::{ChatCompleteModel, GeminiChatCompleter};
use crate::error::GeminiError;

/// Settings for [`Client::new`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_key: SecretString,
    /// Defaults to the public Generative Language endpoint
    pub base_url: Option<Url>,
    pub timeout: Option<Duration>,
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: None,
            timeout: None,
        }
    }
}

/// Settings for [`Client::chat_completer`]
#[derive(Debug, Clone)]
pub struct ChatCompleterOptions {
    pub model: ChatCompleteModel,
}

/// Entry point holding a shared backend
#[derive(Clone)]
pub struct Client {
    backend: Arc<dyn Backend>,
}

impl Client {
    /// Client talking to Gemini over HTTP
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::InvalidConfig` if the HTTP backend cannot be
    /// built from `options`.
    pub fn new(options: ClientOptions) -> Result<Self, GeminiError> {
        let backend = HttpBackend::new(options.api_key, options.base_url, options.timeout)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Client over any backend implementation
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Client built from the `[gemini]` configuration section
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::InvalidConfig` if the timeout does not parse or
    /// the HTTP backend cannot be built.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let timeout = config
            .timeout()
            .map_err(|e| GeminiError::InvalidConfig(e.to_string()))?;

        Self::new(ClientOptions {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout,
        })
    }

    /// Chat completer bound to one model
    pub fn chat_completer(&self, options: ChatCompleterOptions) -> GeminiChatCompleter {
        GeminiChatCompleter::new(Arc::clone(&self.backend), options.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completer_uses_requested_model() {
        let client = Client::new(ClientOptions::new("key")).unwrap();
        let completer = client.chat_completer(ChatCompleterOptions {
            model: ChatCompleteModel::GEMINI_2_5_PRO,
        });
        assert_eq!(completer.model(), &ChatCompleteModel::GEMINI_2_5_PRO);
    }

    #[test]
    fn from_config_rejects_bad_timeout() {
        let mut config = GeminiConfig::new("key");
        config.timeout = Some("whenever".to_owned());

        let Err(GeminiError::InvalidConfig(message)) = Client::from_config(&config) else {
            panic!("expected invalid config");
        };
        assert!(message.contains("gemini.timeout"));
    }

    #[test]
    fn from_config_accepts_base_url_override() {
        let mut config = GeminiConfig::new("key");
        config.base_url = Some(Url::parse("http://127.0.0.1:9/v1beta").unwrap());
        config.timeout = Some("5s".to_owned());
        assert!(Client::from_config(&config).is_ok());
    }
}
