//! Tracing pipeline for the `scout` binary.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `SCOUT_LOG_FORMAT=json` | Newline-delimited JSON logs instead of compact text. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL. When set, spans are also exported over OTLP/HTTP. |
//!
//! Logs always go to stderr so that `--json` output on stdout stays parseable.

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// ────────────────────────────────────────────────────────────────────────────
// Subscriber
// ────────────────────────────────────────────────────────────────────────────

/// Install the global subscriber. Hold the returned guard until exit.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let use_json = std::env::var("SCOUT_LOG_FORMAT").as_deref() == Ok("json");

    let provider = build_provider(service_name);
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("scout")));
    let json_layer = use_json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!use_json).then(|| fmt::layer().compact().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(json_layer)
        .with(text_layer)
        .init();

    TracerProviderGuard(provider)
}

// ────────────────────────────────────────────────────────────────────────────
// Provider guard
// ────────────────────────────────────────────────────────────────────────────

/// Shuts the OTLP provider down on drop, flushing pending spans.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[scout] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OTLP export
// ────────────────────────────────────────────────────────────────────────────

/// The collector URL, if one is configured. A blank value counts as unset so
/// `OTEL_EXPORTER_OTLP_ENDPOINT=` in a shell profile does not enable export.
fn otlp_endpoint(raw: Option<String>) -> Option<String> {
    raw.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())
}

/// `None` when no endpoint is configured or the exporter fails to build;
/// the failure is reported on stderr.
///
/// Spans carry the scout version so traces from different builds of the
/// agent can be told apart.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = otlp_endpoint(std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok())?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[scout] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attribute(KeyValue::new("service.version", env!("CARGO_PKG_VERSION")))
        .build();

    // The CLI is synchronous, so the simple exporter is used: a batch
    // exporter would need a runtime to flush from.
    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            .with_simple_exporter(exporter)
            .build(),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
