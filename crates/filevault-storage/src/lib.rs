//! # filevault-storage
//!
//! Physical storage for FileVault: the local filesystem provider, the
//! thumbnail generator, and the upload pipeline that ties them together.

pub mod pipeline;
pub mod providers;
pub mod thumbnail;

pub use pipeline::{IncomingUpload, StoredFile, UploadPipeline};
pub use providers::LocalStorageProvider;
pub use thumbnail::ThumbnailGenerator;
