//! Typed path parameter helpers.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use filevault_core::error::AppError;
use filevault_core::types::FileId;

use crate::error::ApiError;

/// Parses a file id from a path segment.
pub fn parse_file_id(s: &str) -> Result<FileId, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid file id: {s}")))
}

/// The `{id}` segment of a file route.
#[derive(Debug, Clone, Copy)]
pub struct FileIdPath(pub FileId);

impl<S: Send + Sync> FromRequestParts<S> for FileIdPath {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid path: {e}")))?;
        Ok(Self(parse_file_id(&raw)?))
    }
}
