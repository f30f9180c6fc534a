// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading for the analysis pipeline

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Maximum accepted file size (16MB, same ceiling the upload form enforces)
pub const MAX_IMAGE_SIZE: usize = 16 * 1024 * 1024;

/// Errors raised while reading an image from disk
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Read and decode the image stored at `path`
///
/// The format is sniffed from the file contents, never from the extension,
/// so uploads saved under a generic name still decode.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes, applying any EXIF orientation
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge(bytes.len(), MAX_IMAGE_SIZE));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let mut reader = ImageReader::new(Cursor::new(bytes));
    reader.set_format(format);
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    // Camera photos store pixels sensor-side up; the EXIF tag says how to turn them.
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);

    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| ImageError::DecodeFailed(e.to_string()))?;
    img.apply_orientation(orientation);

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
    };

    Ok((img, info))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}
