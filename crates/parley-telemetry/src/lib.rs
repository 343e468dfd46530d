//! Logging and tracing setup for Parley
//!
//! Installs a `tracing` subscriber with a formatted log layer and, when an
//! OTLP exporter is configured, a span exporter bridged through
//! `tracing-opentelemetry`.

mod metadata;

use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use parley_config::TelemetryConfig;
use parley_config::telemetry::exporters::{ExportProtocol, ExporterConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Guard that flushes and shuts down span export on drop
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported
    pub const fn is_exporting(&self) -> bool {
        self.tracer_provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("failed to shutdown tracer provider: {e}");
        }
    }
}

/// Initialize logging and tracing from configuration
///
/// `log_filter` uses `EnvFilter` syntax and falls back to `info` when it
/// cannot be parsed. Returns a guard that must be held for the lifetime of
/// the application.
///
/// # Errors
///
/// Returns an error if the OTLP span exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>, log_filter: &str) -> anyhow::Result<TelemetryGuard> {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let Some((telemetry_config, exporter_config)) =
        config.and_then(|c| c.trace_exporter().map(|exporter| (c, exporter)))
    else {
        tracing_subscriber::registry().with(filter).with(fmt_layer).init();
        return Ok(TelemetryGuard { tracer_provider: None });
    };

    let tracer_provider = init_tracer(telemetry_config, exporter_config)?;
    let tracer = tracer_provider.tracer("parley");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
    global::set_tracer_provider(tracer_provider.clone());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .init();

    Ok(TelemetryGuard {
        tracer_provider: Some(tracer_provider),
    })
}

/// Build the tracer provider with the configured sampler and exporter
fn init_tracer(config: &TelemetryConfig, exporter_config: &ExporterConfig) -> anyhow::Result<SdkTracerProvider> {
    let exporter = build_span_exporter(exporter_config)?;

    Ok(SdkTracerProvider::builder()
        .with_resource(metadata::build_resource(config))
        .with_sampler(sampler(config))
        .with_batch_exporter(exporter)
        .build())
}

fn sampler(config: &TelemetryConfig) -> Sampler {
    let sampling_rate = config.tracing.as_ref().map_or(1.0, |t| t.sampling_rate);

    let sampler = if sampling_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sampling_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sampling_rate)
    };

    if config.tracing.as_ref().is_none_or(|t| t.parent_based) {
        Sampler::ParentBased(Box::new(sampler))
    } else {
        sampler
    }
}

/// Build the OTLP span exporter for the configured protocol
fn build_span_exporter(config: &ExporterConfig) -> anyhow::Result<opentelemetry_otlp::SpanExporter> {
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};

    let exporter = match config.protocol {
        ExportProtocol::Grpc => SpanExporter::builder()
            .with_tonic()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build gRPC span exporter: {e}"))?,
        ExportProtocol::HttpProto => SpanExporter::builder()
            .with_http()
            .with_endpoint(config.endpoint.as_str())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP span exporter: {e}"))?,
    };

    Ok(exporter)
}

#[cfg(test)]
mod tests {
    use parley_config::telemetry::tracing::TracingConfig;

    use super::*;

    fn config_with_tracing(sampling_rate: f64, parent_based: bool) -> TelemetryConfig {
        TelemetryConfig {
            tracing: Some(TracingConfig {
                sampling_rate,
                parent_based,
                exporter: None,
            }),
            ..TelemetryConfig::default()
        }
    }

    #[test]
    fn full_sampling_is_always_on() {
        let sampler = sampler(&config_with_tracing(1.0, false));
        assert!(matches!(sampler, Sampler::AlwaysOn));
    }

    #[test]
    fn zero_sampling_is_always_off() {
        let sampler = sampler(&config_with_tracing(0.0, false));
        assert!(matches!(sampler, Sampler::AlwaysOff));
    }

    #[test]
    fn parent_based_wraps_ratio_sampler() {
        let sampler = sampler(&config_with_tracing(0.25, true));
        assert!(matches!(sampler, Sampler::ParentBased(_)));
    }

    #[test]
    fn default_config_is_parent_based() {
        let sampler = sampler(&TelemetryConfig::default());
        assert!(matches!(sampler, Sampler::ParentBased(_)));
    }
}
