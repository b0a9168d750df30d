//! Route definitions for the FileVault HTTP API.
//!
//! API routes are mounted under `/api`; stored uploads are served as static
//! files under the configured public path.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::state::AppState;

/// Room for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let max_body = usize::try_from(state.config.storage.max_file_size_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .merge(file_routes(max_body))
        .merge(share_routes())
        .merge(health_routes());

    let uploads = ServeDir::new(&state.config.storage.upload_dir);
    let public_path = state.config.storage.public_path.trim_end_matches('/').to_string();

    Router::new()
        .nest("/api", api_routes)
        .nest_service(&public_path, uploads)
        .with_state(state)
}

/// Owner-scoped collection endpoints
fn file_routes(max_body: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/files/upload",
            post(handlers::file::upload_file).layer(DefaultBodyLimit::max(max_body)),
        )
        .route("/files", get(handlers::file::list_files))
        .route("/files/{id}", axum::routing::delete(handlers::file::delete_file))
        .route("/files/{id}/tags", put(handlers::file::update_tags))
        .route("/files/{id}/reorder", put(handlers::file::reorder_file))
        .route("/files/{id}/stats", get(handlers::file::file_stats))
}

/// Public access and share links
fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/files/{id}/share", post(handlers::share::create_share_link))
        .route("/files/shared/{id}", get(handlers::share::get_shared_file))
        .route("/files/{id}/view", post(handlers::share::record_view))
        .route("/files/{id}/download", get(handlers::share::download_file))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
