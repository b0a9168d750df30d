//! File record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use filevault_core::error::AppError;
use filevault_core::types::{FileId, OwnerId};

/// Maximum number of tags a single record may carry.
pub const MAX_TAGS: usize = 64;

/// Maximum length of a single tag, in characters, after trimming.
pub const MAX_TAG_LENGTH: usize = 64;

/// A file stored in FileVault.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: FileId,
    /// The owner whose collection this record belongs to. Never changes.
    pub owner_id: OwnerId,
    /// Original file name as uploaded.
    pub name: String,
    /// MIME type reported by the client.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Storage locator relative to the upload directory.
    pub storage_path: String,
    /// Public URL of the stored bytes.
    pub url: String,
    /// Public URL of the thumbnail, for images that were thumbnailed.
    pub thumbnail_url: Option<String>,
    /// Free-form labels.
    pub tags: Vec<String>,
    /// Manual ordering key, unique within the owner's collection.
    pub position: i64,
    /// Usage counters.
    #[sqlx(flatten)]
    pub stats: FileStats,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Whether a thumbnail asset exists alongside the primary asset.
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_url.is_some()
    }

    /// Whether the record carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// View, download, and share counters of a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FileStats {
    /// Number of recorded views.
    pub view_count: i64,
    /// Number of downloads served.
    pub download_count: i64,
    /// When the file was last viewed.
    pub last_viewed_at: Option<DateTime<Utc>>,
    /// Number of share links handed out.
    pub share_count: i64,
}

/// Data required to create a new file record.
///
/// Position and counters are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFileRecord {
    /// The owner of the new record.
    pub owner_id: OwnerId,
    /// Original file name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Storage locator.
    pub storage_path: String,
    /// Public URL of the stored bytes.
    pub url: String,
    /// Public URL of the thumbnail.
    pub thumbnail_url: Option<String>,
}

/// Normalize a client-supplied tag list.
///
/// Tags are trimmed, empty entries dropped, and duplicates removed while
/// keeping the first occurrence.
pub fn normalize_tags(raw: &[String]) -> Result<Vec<String>, AppError> {
    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::validation(format!(
                "Tag exceeds {MAX_TAG_LENGTH} characters"
            )));
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.len() > MAX_TAGS {
        return Err(AppError::validation(format!(
            "At most {MAX_TAGS} tags are allowed"
        )));
    }
    Ok(tags)
}
