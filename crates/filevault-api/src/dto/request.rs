//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the file listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListFilesQuery {
    /// Only list files carrying this tag.
    pub tag: Option<String>,
}

/// Replacement tag set for a file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTagsRequest {
    /// New tags; trimmed and de-duplicated server side.
    pub tags: Vec<String>,
}

/// Target position for a file.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReorderRequest {
    /// Requested position; values past the end move the file last.
    #[serde(alias = "newPosition")]
    #[validate(range(min = 0, message = "Position must be a non-negative integer"))]
    pub new_position: i64,
}
