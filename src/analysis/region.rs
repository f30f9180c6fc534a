// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analysis region selection
//!
//! Two tiers: the largest detected face, padded for context, or a center crop
//! when no face was found. Close-up skin photos rarely contain a detectable
//! face, so the fallback assumes the subject fills the frame.

use image::{imageops, RgbImage};
use tracing::debug;

use super::error::AnalysisError;
use super::face_locator::BoundingBox;

/// Default padding around a face box, as a fraction of its shorter side
pub const DEFAULT_FACE_PADDING_RATIO: f32 = 0.2;

/// Default side fraction kept by the center-crop fallback
pub const DEFAULT_CENTER_CROP_FRACTION: f32 = 0.6;

/// Default minimum image side for the center-crop fallback
pub const DEFAULT_MIN_IMAGE_DIMENSION: u32 = 100;

/// Crop rectangle within the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Region selection parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RegionConfig {
    pub face_padding_ratio: f32,
    pub center_crop_fraction: f32,
    pub min_image_dimension: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            face_padding_ratio: DEFAULT_FACE_PADDING_RATIO,
            center_crop_fraction: DEFAULT_CENTER_CROP_FRACTION,
            min_image_dimension: DEFAULT_MIN_IMAGE_DIMENSION,
        }
    }
}

impl RegionConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.face_padding_ratio.is_finite() && self.face_padding_ratio >= 0.0) {
            anyhow::bail!(
                "face_padding_ratio must be >= 0.0, got {}",
                self.face_padding_ratio
            );
        }
        if !(self.center_crop_fraction > 0.0 && self.center_crop_fraction <= 1.0) {
            anyhow::bail!(
                "center_crop_fraction must be in (0.0, 1.0], got {}",
                self.center_crop_fraction
            );
        }
        Ok(())
    }
}

/// The pixels handed to the classifiers
#[derive(Debug, Clone)]
pub struct Region {
    pub image: RgbImage,
    pub rect: CropRect,
    /// True when the region came from a detected face
    pub used_face: bool,
}

/// Pick the analysis region for `image`
///
/// Fails only when no face was found and the image is below the minimum size
/// the center-crop fallback needs.
pub fn select_region(
    image: &RgbImage,
    boxes: &[BoundingBox],
    config: &RegionConfig,
) -> Result<Region, AnalysisError> {
    let (width, height) = image.dimensions();

    let face_rect = largest_face(boxes, width, height, config.face_padding_ratio);

    let (rect, used_face) = match face_rect {
        Some(rect) => (rect, true),
        None => {
            if width < config.min_image_dimension || height < config.min_image_dimension {
                return Err(AnalysisError::ImageTooSmall { width, height });
            }
            (center_crop(width, height, config.center_crop_fraction), false)
        }
    };

    debug!(
        "Selected {} region {}x{} at ({}, {})",
        if used_face { "face" } else { "center" },
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );

    let region = imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image();

    Ok(Region {
        image: region,
        rect,
        used_face,
    })
}

/// Padded, clamped crop of the largest usable box
///
/// Boxes whose crop would be empty after clamping are skipped. Ties keep the
/// first box.
pub fn largest_face(
    boxes: &[BoundingBox],
    image_width: u32,
    image_height: u32,
    padding_ratio: f32,
) -> Option<CropRect> {
    let mut best: Option<(u64, CropRect)> = None;

    for bbox in boxes.iter().filter(|b| b.is_valid()) {
        let rect = padded_crop(bbox, image_width, image_height, padding_ratio);
        if rect.is_empty() {
            continue;
        }
        match best {
            Some((area, _)) if area >= bbox.area() => {}
            _ => best = Some((bbox.area(), rect)),
        }
    }

    best.map(|(_, rect)| rect)
}

/// Grow `bbox` by `padding_ratio * min(w, h)` per side and clamp to the image
pub fn padded_crop(
    bbox: &BoundingBox,
    image_width: u32,
    image_height: u32,
    padding_ratio: f32,
) -> CropRect {
    let pad = (padding_ratio * bbox.width.min(bbox.height) as f32) as i64;

    let x1 = (bbox.x as i64 - pad).max(0);
    let y1 = (bbox.y as i64 - pad).max(0);
    let x2 = (bbox.x as i64 + bbox.width as i64 + pad).min(image_width as i64);
    let y2 = (bbox.y as i64 + bbox.height as i64 + pad).min(image_height as i64);

    if x2 <= x1 || y2 <= y1 {
        return CropRect {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
        };
    }

    CropRect {
        x: x1 as u32,
        y: y1 as u32,
        width: (x2 - x1) as u32,
        height: (y2 - y1) as u32,
    }
}

/// Central `fraction × fraction` window of the image
pub fn center_crop(width: u32, height: u32, fraction: f32) -> CropRect {
    let crop_width = (width as f32 * fraction) as u32;
    let crop_height = (height as f32 * fraction) as u32;

    CropRect {
        x: (width - crop_width) / 2,
        y: (height - crop_height) / 2,
        width: crop_width,
        height: crop_height,
    }
}
