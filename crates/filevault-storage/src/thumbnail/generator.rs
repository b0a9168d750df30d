//! Square cover-crop thumbnails for image uploads.

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use filevault_core::error::{AppError, ErrorKind};
use filevault_core::result::AppResult;
use filevault_core::traits::storage::StorageProvider;

/// Generates thumbnails next to the files they belong to.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    /// Storage provider for writing thumbnails.
    provider: Arc<dyn StorageProvider>,
    /// Edge length of the square output in pixels.
    size: u32,
    /// Prefix prepended to the source name.
    prefix: String,
}

impl ThumbnailGenerator {
    /// Create a new thumbnail generator.
    pub fn new(provider: Arc<dyn StorageProvider>, size: u32, prefix: impl Into<String>) -> Self {
        Self {
            provider,
            size,
            prefix: prefix.into(),
        }
    }

    /// Whether uploads of this MIME type get a thumbnail.
    pub fn is_supported(mime_type: &str) -> bool {
        mime_type.to_ascii_lowercase().starts_with("image/")
    }

    /// Storage path of the thumbnail belonging to `source_path`.
    pub fn thumbnail_path(&self, source_path: &str) -> String {
        match source_path.rsplit_once('/') {
            Some((dir, name)) => format!("{dir}/{}{name}", self.prefix),
            None => format!("{}{source_path}", self.prefix),
        }
    }

    /// Render and store the thumbnail of an already stored image.
    ///
    /// Returns the storage path of the thumbnail.
    pub async fn generate(&self, source_path: &str, data: Bytes) -> AppResult<String> {
        let size = self.size;
        let format = output_format(source_path);

        let thumbnail = tokio::task::spawn_blocking(move || render(&data, size, format))
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Thumbnail task panicked", e))??;

        let thumb_path = self.thumbnail_path(source_path);
        self.provider.write(&thumb_path, thumbnail).await?;

        debug!(
            source = source_path,
            size,
            output = %thumb_path,
            "Generated thumbnail"
        );

        Ok(thumb_path)
    }
}

/// Pick the encoding for a thumbnail from the source name's extension.
fn output_format(source_path: &str) -> ImageFormat {
    match ImageFormat::from_path(Path::new(source_path)) {
        Ok(
            format @ (ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::WebP
            | ImageFormat::Tiff),
        ) => format,
        _ => ImageFormat::Png,
    }
}

/// Decode, cover-crop to `size`×`size`, and re-encode.
fn render(data: &[u8], size: u32, format: ImageFormat) -> AppResult<Bytes> {
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_source(ErrorKind::Storage, format!("Failed to decode image: {e}"), e)
    })?;

    let thumb = img.resize_to_fill(size, size, FilterType::Lanczos3);
    let thumb = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(thumb.to_rgb8()),
        _ => DynamicImage::ImageRgba8(thumb.to_rgba8()),
    };

    let mut cursor = Cursor::new(Vec::new());
    thumb.write_to(&mut cursor, format).map_err(|e| {
        AppError::with_source(ErrorKind::Storage, format!("Failed to encode thumbnail: {e}"), e)
    })?;

    Ok(Bytes::from(cursor.into_inner()))
}
