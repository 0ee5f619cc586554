//! Tracing and OpenTelemetry initialisation.
//!
//! Call [`init_tracing`] once at process startup, before the Tokio runtime
//! exists, and keep the returned guard alive until exit.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set, spans are exported over OTLP/HTTP. |
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `VEIL_LOG_FORMAT=json` | Emit newline-delimited JSON logs instead of the compact console format. |

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Set up the global `tracing` subscriber.
///
/// Console output format and filtering come from the environment (see the
/// module table); when an OTLP endpoint is configured an export layer is
/// stacked on top of the console layer.  The returned guard must be held for
/// the whole process lifetime so pending spans are flushed on exit.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into())));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> =
        if std::env::var("VEIL_LOG_FORMAT").as_deref() == Ok("json") {
            Box::new(tracing_subscriber::fmt::layer().json())
        } else {
            Box::new(tracing_subscriber::fmt::layer().compact())
        };

    let provider = build_provider(service_name);

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> =
        vec![Box::new(env_filter), fmt_layer];
    if let Some(ref p) = provider {
        layers.push(Box::new(
            tracing_opentelemetry::layer().with_tracer(p.tracer("veil")),
        ));
    }

    tracing_subscriber::registry().with(layers).init();

    TracerProviderGuard(provider)
}

/// Shuts down the OTel [`SdkTracerProvider`] on drop, flushing pending span
/// batches.  Hold an instance in `main` for the entire program lifetime.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[veil] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

/// Build the tracer provider when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// Returns `None` when the env-var is absent or the exporter fails to
/// initialise; the error goes to stderr and the caller falls back to plain
/// console output.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[veil] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            // Simple (synchronous) exporter: init_tracing runs before the
            // Tokio runtime is created, so a batch exporter, which spawns
            // tasks internally, would be unsafe here.
            .with_simple_exporter(exporter)
            .build(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
