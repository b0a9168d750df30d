//! File upload service.

use std::sync::Arc;

use tracing::{error, info};

use filevault_core::error::AppError;
use filevault_database::repositories::FileRepository;
use filevault_entity::file::{CreateFileRecord, FileRecord};
use filevault_storage::{IncomingUpload, UploadPipeline};

use crate::context::RequestContext;

/// Turns an incoming upload into a file record at the end of the
/// caller's collection.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Upload pipeline.
    pipeline: Arc<UploadPipeline>,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(file_repo: Arc<dyn FileRepository>, pipeline: Arc<UploadPipeline>) -> Self {
        Self {
            file_repo,
            pipeline,
        }
    }

    /// Store the upload and append a record for it.
    ///
    /// `origin` roots the public URLs of the stored assets. If the record
    /// cannot be created the stored assets are released again.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        upload: IncomingUpload,
        origin: &str,
    ) -> Result<FileRecord, AppError> {
        let stored = self.pipeline.accept(upload, origin).await?;

        let record = CreateFileRecord {
            owner_id: ctx.owner_id,
            name: stored.original_name.clone(),
            mime_type: stored.mime_type.clone(),
            size_bytes: stored.size_bytes as i64,
            storage_path: stored.storage_path.clone(),
            url: stored.url.clone(),
            thumbnail_url: stored.thumbnail_url.clone(),
        };

        let file = match self.file_repo.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(release_err) = self
                    .pipeline
                    .release(&stored.storage_path, stored.thumbnail_url.is_some())
                    .await
                {
                    error!(
                        storage_path = %stored.storage_path,
                        error = %release_err,
                        "Failed to release upload after record creation failed"
                    );
                }
                return Err(e);
            }
        };

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file.id,
            name = %file.name,
            size = file.size_bytes,
            position = file.position,
            "Upload completed"
        );

        Ok(file)
    }
}
