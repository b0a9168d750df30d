//! # filevault-service
//!
//! Business logic service layer for FileVault. Each service orchestrates
//! the file repository and the upload pipeline to implement one group of
//! use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod share;

pub use context::RequestContext;
pub use file::{DownloadResult, DownloadService, FileService, UploadService};
pub use share::{ShareLink, ShareService};

#[cfg(test)]
pub(crate) mod testing;
