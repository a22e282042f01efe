//! # exh-api: HTTP Service for the Exhortos Exchange
//!
//! Exposes the declare-then-upload protocol of `exh-exchange` over HTTP.
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/v1/exh_exhortos*` | [`routes::exhortos`] | Exhortos |
//! | `/v1/exh_exhortos_promociones*` | [`routes::promociones`] | Promociones |
//! | `/v1/exh_exhortos_respuestas*` | [`routes::respuestas`] | Respuestas |
//! | `/v1/exh_exhortos_actualizaciones` | [`routes::actualizaciones`] | Actualizaciones |
//! | `/health/*`, `/metrics`, `/openapi.json` | this module, [`openapi`] | Operations |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → DefaultBodyLimit → Handler
//! ```
//!
//! The body limit leaves headroom above the configured file cap so that an
//! oversized file still reaches the exchange core and is answered with a
//! `PAYLOAD_TOO_LARGE` envelope. Only bodies far beyond it are cut at the
//! transport level (413).

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Transport headroom above the file cap, for multipart framing and text
/// parts.
const BODY_LIMIT_HEADROOM: u64 = 1024 * 1024;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let body_limit = upload_body_limit(state.service.config().max_file_bytes);

    let api = Router::new()
        .merge(routes::router())
        .merge(openapi::router())
        .route("/metrics", get(render_metrics))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new().merge(health).merge(api)
}

fn upload_body_limit(max_file_bytes: u64) -> usize {
    usize::try_from(max_file_bytes.saturating_mul(2).saturating_add(BODY_LIMIT_HEADROOM))
        .unwrap_or(usize::MAX)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe.
async fn readiness() -> &'static str {
    "ready"
}

/// Prometheus exposition text.
async fn render_metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or_else(|| AppError::NotFound("metrics exporter is not installed".to_string()))
}
