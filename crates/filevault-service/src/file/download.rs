//! Public file download.

use std::sync::Arc;

use tracing::debug;

use filevault_core::error::AppError;
use filevault_core::traits::storage::ByteStream;
use filevault_core::types::FileId;
use filevault_database::repositories::FileRepository;
use filevault_entity::file::FileRecord;
use filevault_storage::UploadPipeline;

/// Streams stored files to anyone who knows their id.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Upload pipeline.
    pipeline: Arc<UploadPipeline>,
}

/// File metadata and content stream for a download.
pub struct DownloadResult {
    /// File metadata.
    pub file: FileRecord,
    /// File content.
    pub stream: ByteStream,
    /// MIME type for Content-Type header.
    pub content_type: String,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("file", &self.file.id)
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .finish()
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(file_repo: Arc<dyn FileRepository>, pipeline: Arc<UploadPipeline>) -> Self {
        Self {
            file_repo,
            pipeline,
        }
    }

    /// Open a file for download and count the download.
    ///
    /// The counter only moves once the stored bytes could be opened.
    pub async fn download(&self, file_id: FileId) -> Result<DownloadResult, AppError> {
        let file = self
            .file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))?;

        let stream = self.pipeline.open(&file.storage_path).await?;
        let stats = self.file_repo.record_download(file.id).await?;

        debug!(
            file_id = %file.id,
            downloads = stats.download_count,
            "Serving download"
        );

        Ok(DownloadResult {
            content_type: file.mime_type.clone(),
            filename: file.name.clone(),
            file,
            stream,
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use filevault_core::types::OwnerId;

    use super::*;
    use crate::context::RequestContext;
    use crate::testing::{Fixture, VIDEO_BYTES};

    #[tokio::test]
    async fn test_download_streams_and_counts() {
        let fx = Fixture::new().await;
        let ctx = RequestContext::new(OwnerId::new());
        let file = fx.upload(&ctx, "clip.mp4").await;

        let mut result = fx.download_service().download(file.id).await.unwrap();
        assert_eq!(result.filename, "clip.mp4");
        assert_eq!(result.content_type, "video/mp4");

        let mut body = Vec::new();
        while let Some(chunk) = result.stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(body, VIDEO_BYTES);

        let stats = fx.file_service().stats(&ctx, file.id).await.unwrap();
        assert_eq!(stats.download_count, 1);
    }

    #[tokio::test]
    async fn test_download_unknown_id() {
        let fx = Fixture::new().await;
        let err = fx
            .download_service()
            .download(FileId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_asset_does_not_count() {
        let fx = Fixture::new().await;
        let ctx = RequestContext::new(OwnerId::new());
        let file = fx.upload(&ctx, "clip.mp4").await;
        fx.remove(&file.storage_path).await;

        assert!(fx.download_service().download(file.id).await.is_err());
        let stats = fx.file_service().stats(&ctx, file.id).await.unwrap();
        assert_eq!(stats.download_count, 0);
    }
}
