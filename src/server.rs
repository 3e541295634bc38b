//! Web server module for the exporter.
//!
//! Serves the Prometheus scrape endpoint, a liveness probe and a small
//! landing page.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};

use crate::engine::Engine;
use crate::metrics::{ObservationBuffer, render};

/// Header carrying the Prometheus scrape timeout in seconds.
pub const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub metrics_path: String,
    /// Exporter self metrics, rendered after the device metrics.
    pub exporter: Registry,
    /// Scrape deadline used without a timeout header.
    pub scrape_timeout: Duration,
    /// Subtracted from the header timeout to leave room for rendering.
    pub scrape_timeout_offset: Duration,
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();
    let app_state = Arc::new(state);

    Router::new()
        .route("/", get(landing_handler))
        .route("/healthz", get(healthz_handler))
        .route(&metrics_path, get(metrics_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .with_state(app_state)
}

/// Time allowed for one scrape.
///
/// Uses the Prometheus timeout header minus `offset` when the header holds a
/// positive number of seconds, otherwise `default`. If the offset would eat
/// the whole header timeout, the header value is used as is.
pub fn scrape_timeout(headers: &HeaderMap, default: Duration, offset: Duration) -> Duration {
    let header_timeout = headers
        .get(SCRAPE_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    match header_timeout {
        Some(timeout) if timeout > offset => timeout - offset,
        Some(timeout) => timeout,
        None => default,
    }
}

/// Prometheus scrape: collect every device, then render the text format.
async fn metrics_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let timeout = scrape_timeout(&headers, state.scrape_timeout, state.scrape_timeout_offset);
    let deadline = Instant::now() + timeout;

    let sink = ObservationBuffer::new();
    let summary = state.engine.collect_all(deadline, &sink).await;
    tracing::debug!(
        timeout_ms = timeout.as_millis(),
        devices = summary.devices,
        up = summary.up,
        "Scrape served"
    );

    match render(&sink.drain(), &state.exporter) {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Metrics render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}

/// Liveness probe. Does not touch any device.
async fn healthz_handler() -> &'static str {
    "ok"
}

/// Landing page linking to the scrape endpoint.
async fn landing_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html>\n<head><title>MikroTik Exporter</title></head>\n<body>\n\
         <h1>MikroTik Exporter</h1>\n<p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n</html>\n",
        path = state.metrics_path
    ))
}
