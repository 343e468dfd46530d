use serde::Deserialize;

use super::exporters::ExporterConfig;

/// Tracing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    /// Fraction of traces to sample (0.0 to 1.0)
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    /// Respect the parent span's sampling decision
    #[serde(default = "default_true")]
    pub parent_based: bool,
    /// Override the default exporter for spans
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_sampling_rate() -> f64 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}
