//! Upload pipeline configuration.

use serde::{Deserialize, Serialize};

/// Where uploads are written and which uploads are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding stored files and thumbnails.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes (default 50 MB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Accepted MIME type prefixes.
    #[serde(default = "default_allowed_mime_prefixes")]
    pub allowed_mime_prefixes: Vec<String>,
    /// Edge length of the square thumbnail in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// Prefix prepended to the stored file name to name its thumbnail.
    #[serde(default = "default_thumbnail_prefix")]
    pub thumbnail_prefix: String,
    /// URL path under which stored files are served.
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_file_size_bytes: default_max_file_size(),
            allowed_mime_prefixes: default_allowed_mime_prefixes(),
            thumbnail_size: default_thumbnail_size(),
            thumbnail_prefix: default_thumbnail_prefix(),
            public_path: default_public_path(),
        }
    }
}

impl StorageConfig {
    /// Whether a MIME type is accepted by the upload pipeline.
    pub fn accepts_mime(&self, mime_type: &str) -> bool {
        let mime_type = mime_type.to_ascii_lowercase();
        self.allowed_mime_prefixes
            .iter()
            .any(|prefix| mime_type.starts_with(&prefix.to_ascii_lowercase()))
    }
}

fn default_upload_dir() -> String {
    "./data/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    52_428_800 // 50 MB
}

fn default_allowed_mime_prefixes() -> Vec<String> {
    vec!["image/".to_string(), "video/".to_string()]
}

fn default_thumbnail_size() -> u32 {
    200
}

fn default_thumbnail_prefix() -> String {
    "thumb_".to_string()
}

fn default_public_path() -> String {
    "/uploads".to_string()
}
