//! Router configuration for the web server.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Room for multipart boundaries and the text fields next to the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    Router::new()
        // Upload form, results page, and downloads
        .route("/", get(handlers::index))
        .route("/extract", post(handlers::extract_page))
        .route("/download", post(handlers::download))
        // JSON API
        .route("/api/extract", post(handlers::api_extract))
        .route("/api/annotate", post(handlers::api_annotate))
        .route("/api/health", get(handlers::api_health))
        // Static assets
        .route("/static/style.css", get(handlers::serve_css))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
