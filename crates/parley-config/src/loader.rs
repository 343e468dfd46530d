use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the Gemini section is incomplete or malformed
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_gemini_config()?;
        self.validate_telemetry_config()?;
        Ok(())
    }

    fn validate_gemini_config(&self) -> anyhow::Result<()> {
        let gemini = &self.gemini;

        if gemini.api_key.expose_secret().is_empty() {
            anyhow::bail!("gemini.api_key must not be empty");
        }

        if gemini.model.trim().is_empty() {
            anyhow::bail!("gemini.model must not be empty");
        }

        if let Some(ref base_url) = gemini.base_url
            && !matches!(base_url.scheme(), "http" | "https")
        {
            anyhow::bail!("gemini.base_url must use http or https, got '{}'", base_url.scheme());
        }

        gemini.timeout()?;

        Ok(())
    }

    fn validate_telemetry_config(&self) -> anyhow::Result<()> {
        let Some(sampling_rate) = self
            .telemetry
            .as_ref()
            .and_then(|t| t.tracing.as_ref())
            .map(|t| t.sampling_rate)
        else {
            return Ok(());
        };

        if !(0.0..=1.0).contains(&sampling_rate) {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
