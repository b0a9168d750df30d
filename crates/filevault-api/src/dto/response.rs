//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use filevault_core::types::{FileId, OwnerId};
use filevault_entity::file::{FileRecord, FileStats};
use filevault_service::share::ShareLink;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Public projection of a file record. The storage locator is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    /// File ID.
    pub id: FileId,
    /// Owner ID.
    pub owner_id: OwnerId,
    /// Original file name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Public URL.
    pub url: String,
    /// Thumbnail URL, for images.
    pub thumbnail_url: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Position in the owner's collection.
    pub position: i64,
    /// Usage counters.
    pub stats: StatsResponse,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<FileRecord> for FileResponse {
    fn from(f: FileRecord) -> Self {
        Self {
            id: f.id,
            owner_id: f.owner_id,
            name: f.name,
            mime_type: f.mime_type,
            size_bytes: f.size_bytes,
            url: f.url,
            thumbnail_url: f.thumbnail_url,
            tags: f.tags,
            position: f.position,
            stats: f.stats.into(),
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

/// Usage counters of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Views.
    pub view_count: i64,
    /// Downloads.
    pub download_count: i64,
    /// Last view.
    pub last_viewed_at: Option<DateTime<Utc>>,
    /// Share links handed out.
    pub share_count: i64,
}

impl From<FileStats> for StatsResponse {
    fn from(s: FileStats) -> Self {
        Self {
            view_count: s.view_count,
            download_count: s.download_count,
            last_viewed_at: s.last_viewed_at,
            share_count: s.share_count,
        }
    }
}

/// Public link to a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkResponse {
    /// Shared file.
    pub file_id: FileId,
    /// Unauthenticated URL.
    pub url: String,
}

impl From<ShareLink> for ShareLinkResponse {
    fn from(link: ShareLink) -> Self {
        Self {
            file_id: link.file_id,
            url: link.url,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` or `"degraded"`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Store backend name.
    pub store: String,
    /// Whether the store answered.
    pub store_healthy: bool,
    /// Whether the upload directory is usable.
    pub storage_healthy: bool,
}
