//! Owner-scoped file handlers: upload, listing, tags, ordering, stats, delete.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;

use filevault_core::error::AppError;
use filevault_storage::IncomingUpload;

use crate::dto::request::{ListFilesQuery, ReorderRequest, UpdateTagsRequest};
use crate::dto::response::{ApiResponse, FileResponse, MessageResponse, StatsResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, FileIdPath, RequestOrigin, ValidatedJson};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::upload_rejected("File size too large")
    } else {
        AppError::validation(format!("Multipart error: {}", e.body_text()))
    }
}

/// POST /api/files/upload
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    origin: RequestOrigin,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<FileResponse>>), ApiError> {
    let mut upload: Option<IncomingUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        upload = Some(IncomingUpload {
            original_name,
            mime_type,
            data,
        });
    }

    let upload = upload.ok_or_else(|| AppError::upload_rejected("No file uploaded"))?;
    let file = state
        .upload_service
        .upload(&auth, upload, origin.as_str())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file.into()))))
}

/// GET /api/files?tag=...
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let files = state
        .file_service
        .list(&auth, query.tag.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

/// PUT /api/files/{id}/tags
pub async fn update_tags(
    State(state): State<AppState>,
    auth: AuthUser,
    FileIdPath(id): FileIdPath,
    ValidatedJson(req): ValidatedJson<UpdateTagsRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state.file_service.update_tags(&auth, id, &req.tags).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// PUT /api/files/{id}/reorder
pub async fn reorder_file(
    State(state): State<AppState>,
    auth: AuthUser,
    FileIdPath(id): FileIdPath,
    ValidatedJson(req): ValidatedJson<ReorderRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let file = state
        .file_service
        .reorder(&auth, id, req.new_position)
        .await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    FileIdPath(id): FileIdPath,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.file_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "File deleted successfully",
    ))))
}

/// GET /api/files/{id}/stats
pub async fn file_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    FileIdPath(id): FileIdPath,
) -> Result<Json<ApiResponse<StatsResponse>>, ApiError> {
    let stats = state.file_service.stats(&auth, id).await?;
    Ok(Json(ApiResponse::ok(stats.into())))
}
