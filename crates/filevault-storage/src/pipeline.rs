//! Upload pipeline: validation, persistence, thumbnailing, and release of
//! uploaded assets.
//!
//! Uploaded bytes are stored flat under a random name that keeps the
//! original extension. Images additionally get a square thumbnail named
//! with the configured prefix. Public URLs are built from the request
//! origin and the configured public path, which is where the HTTP layer
//! serves the upload directory.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use filevault_core::config::StorageConfig;
use filevault_core::error::AppError;
use filevault_core::result::AppResult;
use filevault_core::traits::storage::{ByteStream, StorageProvider};

use crate::thumbnail::ThumbnailGenerator;

/// A file received from a client, before anything is written.
#[derive(Debug, Clone)]
pub struct IncomingUpload {
    /// File name as sent by the client.
    pub original_name: String,
    /// MIME type as sent by the client.
    pub mime_type: String,
    /// File contents.
    pub data: Bytes,
}

/// Descriptor of a file the pipeline has persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Original client-side file name.
    pub original_name: String,
    /// Name of the stored file inside the upload directory.
    pub file_name: String,
    /// Storage locator of the primary asset.
    pub storage_path: String,
    /// Public URL of the primary asset.
    pub url: String,
    /// Public URL of the thumbnail, when one was produced.
    pub thumbnail_url: Option<String>,
    /// Size of the primary asset in bytes.
    pub size_bytes: u64,
    /// MIME type of the primary asset.
    pub mime_type: String,
}

/// Accepts uploads into storage and releases them again.
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    provider: Arc<dyn StorageProvider>,
    thumbnails: ThumbnailGenerator,
    config: StorageConfig,
}

impl UploadPipeline {
    /// Create a pipeline over `provider`.
    pub fn new(provider: Arc<dyn StorageProvider>, config: StorageConfig) -> Self {
        let thumbnails = ThumbnailGenerator::new(
            Arc::clone(&provider),
            config.thumbnail_size,
            config.thumbnail_prefix.clone(),
        );
        Self {
            provider,
            thumbnails,
            config,
        }
    }

    /// Storage settings the pipeline runs with.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Check that the backing storage is usable.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }

    /// Reject uploads that must not be stored.
    pub fn validate(&self, upload: &IncomingUpload) -> AppResult<()> {
        if upload.data.is_empty() {
            return Err(AppError::upload_rejected("No file uploaded"));
        }
        if !self.config.accepts_mime(&upload.mime_type) {
            return Err(AppError::upload_rejected("Invalid file type"));
        }
        if upload.data.len() as u64 > self.config.max_file_size_bytes {
            return Err(AppError::upload_rejected("File size too large"));
        }
        Ok(())
    }

    /// Validate and persist an upload, producing a thumbnail for images.
    ///
    /// `origin` is the scheme and authority public URLs are rooted at,
    /// e.g. `https://files.example.com`. A failed thumbnail is logged and
    /// the upload proceeds without one.
    pub async fn accept(&self, upload: IncomingUpload, origin: &str) -> AppResult<StoredFile> {
        self.validate(&upload)?;

        let file_name = stored_name(&upload.original_name);
        let size_bytes = upload.data.len() as u64;

        self.provider.write(&file_name, upload.data.clone()).await?;

        let thumbnail_url = if ThumbnailGenerator::is_supported(&upload.mime_type) {
            match self.thumbnails.generate(&file_name, upload.data).await {
                Ok(thumb_path) => Some(self.public_url(origin, &thumb_path)),
                Err(e) => {
                    warn!(
                        file_name = %file_name,
                        error = %e,
                        "Thumbnail generation failed, continuing without thumbnail"
                    );
                    None
                }
            }
        } else {
            None
        };

        info!(
            file_name = %file_name,
            original_name = %upload.original_name,
            mime_type = %upload.mime_type,
            size_bytes,
            thumbnail = thumbnail_url.is_some(),
            "Stored upload"
        );

        Ok(StoredFile {
            url: self.public_url(origin, &file_name),
            original_name: upload.original_name,
            storage_path: file_name.clone(),
            file_name,
            thumbnail_url,
            size_bytes,
            mime_type: upload.mime_type,
        })
    }

    /// Delete a stored file and, when present, its thumbnail.
    ///
    /// Failure to delete the primary asset is returned; failure to delete
    /// the thumbnail is only logged.
    pub async fn release(&self, storage_path: &str, has_thumbnail: bool) -> AppResult<()> {
        self.provider.delete(storage_path).await?;

        if has_thumbnail {
            let thumb_path = self.thumbnails.thumbnail_path(storage_path);
            if let Err(e) = self.provider.delete(&thumb_path).await {
                warn!(
                    thumbnail = %thumb_path,
                    error = %e,
                    "Failed to delete thumbnail"
                );
            }
        }

        Ok(())
    }

    /// Open a stored file for streaming.
    pub async fn open(&self, storage_path: &str) -> AppResult<ByteStream> {
        self.provider.read(storage_path).await
    }

    /// Public URL of a stored path under `origin`.
    pub fn public_url(&self, origin: &str, storage_path: &str) -> String {
        format!(
            "{}{}/{}",
            origin.trim_end_matches('/'),
            self.config.public_path.trim_end_matches('/'),
            storage_path.trim_start_matches('/')
        )
    }
}

/// Random file name keeping the original (lowercased) extension.
fn stored_name(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("{}{extension}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use filevault_core::error::ErrorKind;
    use image::{DynamicImage, ImageFormat, RgbImage};

    use super::*;
    use crate::providers::LocalStorageProvider;

    const ORIGIN: &str = "http://localhost:8080";

    async fn pipeline(config: StorageConfig) -> (tempfile::TempDir, Arc<LocalStorageProvider>, UploadPipeline) {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap());
        let pipeline = UploadPipeline::new(provider.clone(), config);
        (dir, provider, pipeline)
    }

    fn png(width: u32, height: u32) -> Bytes {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30])));
        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        Bytes::from(cursor.into_inner())
    }

    fn upload(name: &str, mime: &str, data: Bytes) -> IncomingUpload {
        IncomingUpload {
            original_name: name.to_string(),
            mime_type: mime.to_string(),
            data,
        }
    }

    #[tokio::test]
    async fn test_accept_image_with_thumbnail() {
        let (_dir, provider, pipeline) = pipeline(StorageConfig::default()).await;

        let stored = pipeline
            .accept(upload("Holiday.PNG", "image/png", png(400, 300)), ORIGIN)
            .await
            .unwrap();

        assert!(stored.file_name.ends_with(".png"));
        assert_eq!(stored.storage_path, stored.file_name);
        assert_eq!(stored.url, format!("{ORIGIN}/uploads/{}", stored.file_name));
        assert_eq!(
            stored.thumbnail_url,
            Some(format!("{ORIGIN}/uploads/thumb_{}", stored.file_name))
        );
        assert!(provider.exists(&stored.file_name).await.unwrap());
        assert!(
            provider
                .exists(&format!("thumb_{}", stored.file_name))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_accept_video_without_thumbnail() {
        let (_dir, _provider, pipeline) = pipeline(StorageConfig::default()).await;

        let stored = pipeline
            .accept(upload("clip.mp4", "video/mp4", Bytes::from_static(b"\x00\x00\x00\x18ftyp")), ORIGIN)
            .await
            .unwrap();

        assert!(stored.thumbnail_url.is_none());
        assert_eq!(stored.size_bytes, 8);
    }

    #[tokio::test]
    async fn test_broken_image_still_stored() {
        let (_dir, provider, pipeline) = pipeline(StorageConfig::default()).await;

        let stored = pipeline
            .accept(upload("x.jpg", "image/jpeg", Bytes::from_static(b"garbage")), ORIGIN)
            .await
            .unwrap();

        assert!(stored.thumbnail_url.is_none());
        assert!(provider.exists(&stored.storage_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejections() {
        let config = StorageConfig {
            max_file_size_bytes: 4,
            ..StorageConfig::default()
        };
        let (_dir, _provider, pipeline) = pipeline(config).await;

        let err = pipeline
            .accept(upload("a.png", "image/png", Bytes::new()), ORIGIN)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UploadRejected);
        assert_eq!(err.message, "No file uploaded");

        let err = pipeline
            .accept(upload("a.pdf", "application/pdf", Bytes::from_static(b"%PD")), ORIGIN)
            .await
            .unwrap_err();
        assert_eq!(err.message, "Invalid file type");

        let err = pipeline
            .accept(upload("a.png", "image/png", Bytes::from_static(b"12345")), ORIGIN)
            .await
            .unwrap_err();
        assert_eq!(err.message, "File size too large");
    }

    #[tokio::test]
    async fn test_release_removes_both_assets() {
        let (_dir, provider, pipeline) = pipeline(StorageConfig::default()).await;
        let stored = pipeline
            .accept(upload("p.png", "image/png", png(20, 20)), ORIGIN)
            .await
            .unwrap();

        pipeline.release(&stored.storage_path, true).await.unwrap();

        assert!(!provider.exists(&stored.storage_path).await.unwrap());
        assert!(
            !provider
                .exists(&format!("thumb_{}", stored.storage_path))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_release_tolerates_missing_thumbnail() {
        let (_dir, provider, pipeline) = pipeline(StorageConfig::default()).await;
        provider.write("only.png", Bytes::from_static(b"x")).await.unwrap();

        pipeline.release("only.png", true).await.unwrap();
        assert!(!provider.exists("only.png").await.unwrap());
    }

    #[tokio::test]
    async fn test_release_fails_when_primary_missing() {
        let (_dir, _provider, pipeline) = pipeline(StorageConfig::default()).await;
        let err = pipeline.release("gone.png", false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }

    #[test]
    fn test_stored_name_keeps_extension() {
        assert!(stored_name("photo.JPG").ends_with(".jpg"));
        assert!(!stored_name("no_extension").contains('.'));
        assert!(!stored_name("weird.ex t").contains(' '));
    }

    #[tokio::test]
    async fn test_public_url_joins_cleanly() {
        let config = StorageConfig {
            public_path: "/files/".to_string(),
            ..StorageConfig::default()
        };
        let (_dir, _provider, pipeline) = pipeline(config).await;
        assert_eq!(
            pipeline.public_url("https://cdn.example.com/", "a.png"),
            "https://cdn.example.com/files/a.png"
        );
    }
}
