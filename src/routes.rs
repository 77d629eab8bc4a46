// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{ads, health},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the ad content and health routes.
/// * Applies global middleware (body limit, Trace, CORS).
/// * Injects global state (configuration and the shared sanitizer).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let ad_routes = Router::new().route("/sanitize", post(ads::sanitize_content));

    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/ads", ad_routes)
        // Global Middleware (applied from outside in)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
