//! Configuration helpers for integration tests

use parley_config::Config;
use parley_gemini::{ChatCompleteModel, ChatCompleterOptions, Client, GeminiChatCompleter};

/// API key every test client sends
pub const TEST_API_KEY: &str = "test-key";

/// Builder for test configurations rendered as TOML
pub struct ConfigBuilder {
    base_url: String,
    model: String,
    timeout: Option<String>,
}

impl ConfigBuilder {
    /// Configuration pointing at a mock backend
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            model: ChatCompleteModel::GEMINI_2_5_FLASH.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.model);
        self
    }

    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.timeout = Some(timeout.to_owned());
        self
    }

    /// Parse the rendered configuration through the real loader
    pub fn build(self) -> Config {
        let mut raw = format!(
            "[gemini]\napi_key = \"{TEST_API_KEY}\"\nbase_url = \"{}\"\nmodel = \"{}\"\n",
            self.base_url, self.model
        );
        if let Some(timeout) = &self.timeout {
            raw.push_str(&format!("timeout = \"{timeout}\"\n"));
        }

        Config::parse(&raw).expect("valid test config")
    }

    /// Chat completer for the configured model
    pub fn completer(self) -> GeminiChatCompleter {
        let config = self.build();
        let client = Client::from_config(&config.gemini).expect("client builds");
        client.chat_completer(ChatCompleterOptions {
            model: ChatCompleteModel::custom(config.gemini.model),
        })
    }
}
