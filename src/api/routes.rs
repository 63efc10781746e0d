use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Recommendations
        .route("/recommend", post(handlers::recommend))
        .route("/validate", post(handlers::validate))
        .route("/feedback", post(handlers::feedback))
        // Event catalog
        .route("/events", get(handlers::list_events))
        .route("/event-types", get(handlers::event_types))
        .route("/locations", get(handlers::locations))
        .route("/external/events", get(handlers::external_events))
        // Diagnostics
        .route("/model/info", get(handlers::model_info))
        .route("/stats", get(handlers::stats))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let origin = match state.inner.config.allowed_origins() {
        None => AllowOrigin::from(Any),
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        ),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
