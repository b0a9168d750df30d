//! Owner-scoped operations on a file collection.

use std::sync::Arc;

use tracing::info;

use filevault_core::error::AppError;
use filevault_core::types::FileId;
use filevault_database::repositories::FileRepository;
use filevault_entity::file::{FileRecord, FileStats, normalize_tags};
use filevault_storage::UploadPipeline;

use crate::context::RequestContext;

/// Listing, tagging, reordering, and deleting an owner's files.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
    /// Pipeline that owns the stored bytes.
    pipeline: Arc<UploadPipeline>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(file_repo: Arc<dyn FileRepository>, pipeline: Arc<UploadPipeline>) -> Self {
        Self {
            file_repo,
            pipeline,
        }
    }

    /// The caller's files in display order, optionally only those tagged `tag`.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        tag: Option<&str>,
    ) -> Result<Vec<FileRecord>, AppError> {
        let tag = tag.map(str::trim).filter(|t| !t.is_empty());
        self.file_repo.list_by_owner(ctx.owner_id, tag).await
    }

    /// Fetch one of the caller's files.
    pub async fn get(&self, ctx: &RequestContext, file_id: FileId) -> Result<FileRecord, AppError> {
        self.file_repo
            .find_owned(file_id, ctx.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Replace the tag set of one of the caller's files.
    pub async fn update_tags(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        tags: &[String],
    ) -> Result<FileRecord, AppError> {
        let tags = normalize_tags(tags)?;
        let file = self
            .file_repo
            .update_tags(file_id, ctx.owner_id, &tags)
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file.id,
            tags = tags.len(),
            "Tags updated"
        );

        Ok(file)
    }

    /// Move one of the caller's files to `new_position`.
    pub async fn reorder(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        new_position: i64,
    ) -> Result<FileRecord, AppError> {
        let file = self
            .file_repo
            .move_to_position(file_id, ctx.owner_id, new_position)
            .await?;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file.id,
            requested = new_position,
            position = file.position,
            "File reordered"
        );

        Ok(file)
    }

    /// Delete one of the caller's files together with its stored assets.
    ///
    /// The record is only removed once the primary asset is gone; a
    /// thumbnail that cannot be removed does not block the delete. A
    /// delete that loses a race with another delete of the same file
    /// reports `NotFound`.
    pub async fn delete(&self, ctx: &RequestContext, file_id: FileId) -> Result<(), AppError> {
        let file = self.get(ctx, file_id).await?;

        if let Err(e) = self
            .pipeline
            .release(&file.storage_path, file.has_thumbnail())
            .await
        {
            if self.file_repo.find_owned(file.id, ctx.owner_id).await?.is_none() {
                return Err(AppError::not_found("File not found"));
            }
            return Err(e);
        }

        self.file_repo.delete(file.id, ctx.owner_id).await?;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file.id,
            name = %file.name,
            "File deleted"
        );

        Ok(())
    }

    /// Usage counters of one of the caller's files.
    pub async fn stats(&self, ctx: &RequestContext, file_id: FileId) -> Result<FileStats, AppError> {
        Ok(self.get(ctx, file_id).await?.stats)
    }
}
