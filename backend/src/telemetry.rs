//! Telemetry initialization: tracing subscriber with optional OpenTelemetry export.
//!
//! `RUST_LOG` takes precedence; otherwise the configured log level applies to
//! this crate and `tower_http`. When an OTLP endpoint is configured, spans are
//! exported alongside the stdout fmt layer.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Build the default filter directive for a log level.
fn default_directive(log_level: &str) -> String {
    format!(
        "asset_library_backend={lvl},tower_http={lvl}",
        lvl = log_level
    )
}

/// Initialize the tracing subscriber.
///
/// The returned guard must be held for the lifetime of the process so that
/// pending spans are flushed on shutdown.
pub fn init_tracing(config: &Config) -> Option<OtelGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.log_level).into());

    match config.otel_endpoint.as_deref() {
        Some(endpoint) => match init_with_otel(endpoint, &config.otel_service_name, env_filter) {
            Ok(guard) => {
                tracing::info!(
                    otel_endpoint = endpoint,
                    service_name = %config.otel_service_name,
                    "OpenTelemetry tracing enabled"
                );
                Some(guard)
            }
            Err(e) => {
                tracing_subscriber::registry()
                    .with(EnvFilter::new(default_directive(&config.log_level)))
                    .with(tracing_subscriber::fmt::layer())
                    .init();
                tracing::warn!("OTLP exporter unavailable, logging to stdout only: {}", e);
                None
            }
        },
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}

/// Shuts down the tracer provider on drop, flushing pending spans.
pub struct OtelGuard {
    provider: opentelemetry_sdk::trace::SdkTracerProvider,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Failed to shutdown OTel tracer provider: {e:?}");
        }
    }
}

fn init_with_otel(
    endpoint: &str,
    service_name: &str,
    env_filter: EnvFilter,
) -> std::result::Result<OtelGuard, Box<dyn std::error::Error + Send + Sync>> {
    use opentelemetry::trace::TracerProvider;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::{SpanExporter, WithExportConfig};
    use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracerProvider};
    use opentelemetry_sdk::Resource;

    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::builder()
        .with_attributes([
            KeyValue::new("service.name", service_name.to_owned()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION").to_owned()),
        ])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_span_processor(BatchSpanProcessor::builder(exporter).build())
        .build();

    let tracer = provider.tracer("asset-library");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    Ok(OtelGuard { provider })
}
