pub mod api;
pub mod config;
pub mod telemetry;

use aldente_core::RecipeSaver;
use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{Level, Span};
use utoipa_swagger_ui::SwaggerUi;

/// Everything handlers need: the saver owns the blob store and its key.
pub struct ServerState {
    pub saver: RecipeSaver,
}

/// Application state shared across all handlers
pub type AppState = Arc<ServerState>;

/// Polled constantly by health checks; its requests get trace-level spans
/// and no completion log.
const QUIET_PATH: &str = "/api/test/unauthed-ping";

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(api::recipes::router())
        .nest("/api/test", api::testing::router())
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(())
                .on_response(log_response),
        )
}

fn request_span(request: &Request<Body>) -> Span {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or(request.uri().path());

    if path == QUIET_PATH {
        tracing::trace_span!("http_request")
    } else {
        tracing::info_span!("http_request", method = %request.method(), path = %path)
    }
}

fn log_response(response: &Response<Body>, latency: Duration, span: &Span) {
    // Disabled spans come from filtered-out levels, normally the quiet path.
    if span.is_disabled() || span.metadata().map(|m| *m.level()) == Some(Level::TRACE) {
        return;
    }
    let status = response.status().as_u16();
    let latency_ms = latency.as_millis() as u64;
    if status >= 500 {
        tracing::error!(status, latency_ms, "request failed with server error");
    } else {
        tracing::info!(status, latency_ms, "request completed");
    }
}
