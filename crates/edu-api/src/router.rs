use axum::{Router, http::StatusCode, middleware, response::IntoResponse, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{metrics, review, state::ApiState};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(review::routes())
        .fallback(handler_404)
}

/// Full application: routes, optional `/metrics` endpoint and the HTTP layers
pub fn app(state: ApiState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let mut app = router().with_state(state);

    if let Some(handle) = metrics_handle {
        let metrics_app = Router::new()
            .route("/metrics", get(metrics::metrics_handler))
            .with_state(handle);
        app = app.merge(metrics_app);
    }

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    app.layer(crate::middleware::cors_layer())
        .layer(trace_layer)
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(middleware::from_fn(crate::middleware::request_id))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
