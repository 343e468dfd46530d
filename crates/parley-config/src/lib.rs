#![allow(clippy::must_use_candidate)]

mod env;
pub mod gemini;
mod loader;
pub mod telemetry;

use serde::Deserialize;

pub use gemini::*;
pub use telemetry::TelemetryConfig;

/// Top-level Parley configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Gemini backend configuration
    pub gemini: GeminiConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
