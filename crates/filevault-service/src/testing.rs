//! Shared fixtures for service tests.

use std::sync::Arc;

use bytes::Bytes;
use tempfile::TempDir;

use filevault_core::config::StorageConfig;
use filevault_core::traits::storage::StorageProvider;
use filevault_database::repositories::MemoryFileRepository;
use filevault_entity::file::FileRecord;
use filevault_storage::{IncomingUpload, LocalStorageProvider, UploadPipeline};

use crate::context::RequestContext;
use crate::file::{DownloadService, FileService, UploadService};
use crate::share::ShareService;

pub(crate) const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42";

pub(crate) struct Fixture {
    _dir: TempDir,
    provider: Arc<LocalStorageProvider>,
    repo: Arc<MemoryFileRepository>,
    pipeline: Arc<UploadPipeline>,
}

impl Fixture {
    pub(crate) async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(LocalStorageProvider::new(dir.path()).await.unwrap());
        let pipeline = Arc::new(UploadPipeline::new(
            provider.clone(),
            StorageConfig::default(),
        ));
        Self {
            _dir: dir,
            provider,
            repo: Arc::new(MemoryFileRepository::new()),
            pipeline,
        }
    }

    pub(crate) fn repo(&self) -> Arc<MemoryFileRepository> {
        self.repo.clone()
    }

    pub(crate) fn pipeline(&self) -> Arc<UploadPipeline> {
        self.pipeline.clone()
    }

    pub(crate) fn file_service(&self) -> FileService {
        FileService::new(self.repo.clone(), self.pipeline.clone())
    }

    pub(crate) fn upload_service(&self) -> UploadService {
        UploadService::new(self.repo.clone(), self.pipeline.clone())
    }

    pub(crate) fn download_service(&self) -> DownloadService {
        DownloadService::new(self.repo.clone(), self.pipeline.clone())
    }

    pub(crate) fn share_service(&self) -> ShareService {
        ShareService::new(self.repo.clone())
    }

    pub(crate) async fn upload(&self, ctx: &RequestContext, name: &str) -> FileRecord {
        self.upload_service()
            .upload(
                ctx,
                IncomingUpload {
                    original_name: name.to_string(),
                    mime_type: "video/mp4".to_string(),
                    data: Bytes::from_static(VIDEO_BYTES),
                },
                "http://test.local",
            )
            .await
            .unwrap()
    }

    pub(crate) async fn stored(&self, path: &str) -> bool {
        self.provider.exists(path).await.unwrap()
    }

    pub(crate) async fn remove(&self, path: &str) {
        self.provider.delete(path).await.unwrap();
    }
}
