//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use filevault_auth::jwt::JwtDecoder;
use filevault_core::config::AppConfig;
use filevault_core::traits::storage::StorageProvider;
use filevault_database::repositories::FileRepository;
use filevault_service::file::{DownloadService, FileService, UploadService};
use filevault_service::share::ShareService;
use filevault_storage::UploadPipeline;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// File record store
    pub file_repo: Arc<dyn FileRepository>,
    /// Upload pipeline over the storage provider
    pub pipeline: Arc<UploadPipeline>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// File collection service
    pub file_service: Arc<FileService>,
    /// Upload service
    pub upload_service: Arc<UploadService>,
    /// Download service
    pub download_service: Arc<DownloadService>,
    /// Share service
    pub share_service: Arc<ShareService>,
}

impl AppState {
    /// Wire services on top of a file store and a storage provider.
    pub fn new(
        config: AppConfig,
        file_repo: Arc<dyn FileRepository>,
        provider: Arc<dyn StorageProvider>,
    ) -> Self {
        let pipeline = Arc::new(UploadPipeline::new(provider, config.storage.clone()));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let file_service = Arc::new(FileService::new(
            Arc::clone(&file_repo),
            Arc::clone(&pipeline),
        ));
        let upload_service = Arc::new(UploadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&pipeline),
        ));
        let download_service = Arc::new(DownloadService::new(
            Arc::clone(&file_repo),
            Arc::clone(&pipeline),
        ));
        let share_service = Arc::new(ShareService::new(Arc::clone(&file_repo)));

        Self {
            config: Arc::new(config),
            file_repo,
            pipeline,
            jwt_decoder,
            file_service,
            upload_service,
            download_service,
            share_service,
        }
    }
}
