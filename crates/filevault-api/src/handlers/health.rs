//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let store_healthy = state.file_repo.health_check().await.unwrap_or(false);
    let storage_healthy = state.pipeline.health_check().await.unwrap_or(false);

    let status = if store_healthy && storage_healthy {
        "ok"
    } else {
        "degraded"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.file_repo.backend().to_string(),
        store_healthy,
        storage_healthy,
    }))
}
