//! # Prometheus Metrics
//!
//! HTTP request metrics recorded through the `metrics` facade and exported
//! by `metrics-exporter-prometheus` at `/metrics`.
//!
//! ## Counters
//! - `exh_http_requests_total{method, path, status}`
//! - `exh_packages_created_total{kind}`, `exh_files_received_total{kind}`,
//!   `exh_packages_completed_total{kind}` (recorded by the exchange core)
//!
//! ## Histograms
//! - `exh_http_request_duration_seconds{method, path}`
//!
//! Without an installed recorder (tests, tools) every macro is a no-op.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the process-wide Prometheus recorder.
///
/// Call once at startup; the returned handle renders the exposition text.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Record one finished request.
pub fn record_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    counter!(
        "exh_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "exh_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

/// Middleware recording count and latency of every request.
///
/// Labels use the matched route template (`/v1/exh_exhortos/{folio}`) so
/// folios and origin ids never become label values.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    record_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}
