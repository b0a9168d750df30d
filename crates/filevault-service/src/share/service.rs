//! Share links, shared fetch, and view counting.
//!
//! There is no per-file sharing switch: any file id is enough to fetch
//! the file's public projection, count a view, or download it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use filevault_core::error::AppError;
use filevault_core::types::FileId;
use filevault_database::repositories::FileRepository;
use filevault_entity::file::{FileRecord, FileStats};

use crate::context::RequestContext;

/// Path, relative to the API origin, under which shared files are fetched.
pub const SHARED_PATH: &str = "/api/files/shared";

/// A public link handed out by the owner of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLink {
    /// The shared file.
    pub file_id: FileId,
    /// Unauthenticated URL of the shared file.
    pub url: String,
}

/// Public access to files by id.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// File repository.
    file_repo: Arc<dyn FileRepository>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(file_repo: Arc<dyn FileRepository>) -> Self {
        Self { file_repo }
    }

    /// Fetch any file by id, without owner scoping.
    pub async fn get_shared(&self, file_id: FileId) -> Result<FileRecord, AppError> {
        self.file_repo
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File not found"))
    }

    /// Count a view of any file.
    pub async fn record_view(&self, file_id: FileId) -> Result<FileStats, AppError> {
        self.file_repo.record_view(file_id).await
    }

    /// Hand out a public link to one of the caller's files.
    pub async fn create_link(
        &self,
        ctx: &RequestContext,
        file_id: FileId,
        origin: &str,
    ) -> Result<ShareLink, AppError> {
        let stats = self.file_repo.record_share(file_id, ctx.owner_id).await?;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file_id,
            share_count = stats.share_count,
            "Share link created"
        );

        Ok(ShareLink {
            file_id,
            url: format!("{}{SHARED_PATH}/{file_id}", origin.trim_end_matches('/')),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use filevault_core::error::ErrorKind;
    use filevault_core::types::OwnerId;

    use super::*;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn test_shared_fetch_ignores_owner() {
        let fx = Fixture::new().await;
        let ctx = RequestContext::new(OwnerId::new());
        let file = fx.upload(&ctx, "a.mp4").await;

        let shared = fx.share_service().get_shared(file.id).await.unwrap();
        assert_eq!(shared.id, file.id);

        let err = fx
            .share_service()
            .get_shared(FileId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_views_all_count() {
        let fx = Fixture::new().await;
        let ctx = RequestContext::new(OwnerId::new());
        let file = fx.upload(&ctx, "a.mp4").await;
        let service = Arc::new(fx.share_service());

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.record_view(file.id).await.unwrap() })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let stats = fx.file_service().stats(&ctx, file.id).await.unwrap();
        assert_eq!(stats.view_count, 25);
        assert!(stats.last_viewed_at.is_some());
    }

    #[tokio::test]
    async fn test_create_link_counts_and_is_owner_scoped() {
        let fx = Fixture::new().await;
        let owner = RequestContext::new(OwnerId::new());
        let stranger = RequestContext::new(OwnerId::new());
        let file = fx.upload(&owner, "a.mp4").await;

        let link = fx
            .share_service()
            .create_link(&owner, file.id, "https://vault.example.com/")
            .await
            .unwrap();
        assert_eq!(
            link.url,
            format!("https://vault.example.com/api/files/shared/{}", file.id)
        );

        let err = fx
            .share_service()
            .create_link(&stranger, file.id, "https://vault.example.com")
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let stats = fx.file_service().stats(&owner, file.id).await.unwrap();
        assert_eq!(stats.share_count, 1);
    }
}
