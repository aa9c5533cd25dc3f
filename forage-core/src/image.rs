//! Image validation and fetching utilities.
//!
//! Generated images are downloaded from the generation service's transient
//! URL and checked here before they are written to blob storage.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::error::FetchError;
use crate::http::HttpClient;

/// Allowed image formats for recipe photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to fetch image: {0}")]
    Fetch(#[from] FetchError),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to read image: {0}")]
    Unreadable(String),

    #[error("Unsupported image format: {0}. Allowed: JPEG, PNG, GIF, WebP")]
    Unsupported(String),
}

/// Result of successfully fetching and validating an image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// The raw image bytes.
    pub data: Vec<u8>,
    /// The detected content type (e.g., "image/jpeg").
    pub content_type: String,
    /// Preferred file extension for the detected format (e.g., "jpg").
    pub extension: &'static str,
}

/// Validate image data: check format is allowed and detect its type.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Unreadable(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| ImageError::Unreadable("Could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::Unsupported(format!("{:?}", format)));
    }

    Ok(format)
}

/// Fetch an image from a URL, then validate its size and format.
pub async fn fetch_and_validate_image<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<FetchedImage, ImageError> {
    let data = client.fetch_bytes(url).await?;

    if data.len() > MAX_FILE_SIZE {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let format = validate_image(&data)?;
    let extension = format.extensions_str().first().copied().unwrap_or("img");

    Ok(FetchedImage {
        data,
        content_type: format.to_mime_type().to_string(),
        extension,
    })
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::new_rgb8(2, 2)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encoding a 2x2 PNG cannot fail");
    buf
}
