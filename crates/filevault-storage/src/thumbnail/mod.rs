//! Thumbnail generation for image uploads.

pub mod generator;

pub use generator::ThumbnailGenerator;
