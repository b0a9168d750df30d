//! Public access handlers: shared fetch, view counting, download, and the
//! owner-only share link.

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::Response;

use filevault_core::error::AppError;

use crate::dto::response::{ApiResponse, FileResponse, MessageResponse, ShareLinkResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, FileIdPath, RequestOrigin};
use crate::state::AppState;

/// POST /api/files/{id}/share
pub async fn create_share_link(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: RequestOrigin,
    FileIdPath(id): FileIdPath,
) -> Result<Json<ApiResponse<ShareLinkResponse>>, ApiError> {
    let link = state
        .share_service
        .create_link(&auth, id, origin.as_str())
        .await?;
    Ok(Json(ApiResponse::ok(link.into())))
}

/// GET /api/files/shared/{id}
pub async fn get_shared_file(
    State(state): State<AppState>,
    FileIdPath(id): FileIdPath,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.share_service.get_shared(id).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// POST /api/files/{id}/view
pub async fn record_view(
    State(state): State<AppState>,
    FileIdPath(id): FileIdPath,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.share_service.record_view(id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("View recorded"))))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    FileIdPath(id): FileIdPath,
) -> Result<Response, ApiError> {
    let result = state.download_service.download(id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&result.filename),
        )
        .body(Body::from_stream(result.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// `attachment` disposition with a header-safe filename.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c == '"' || c == '\\' || c.is_control() || !c.is_ascii() { '_' } else { c })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
