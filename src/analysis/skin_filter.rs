// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Skin-likelihood heuristic for center-crop regions
//!
//! Used only when no face was found. Counts pixels inside a skin-tone band in
//! HSV space and accepts the region when enough of them fall inside it.
//! HSV values use the 8-bit OpenCV scale: hue in `[0, 180)`, saturation and
//! value in `[0, 255]`.

use image::RgbImage;
use tracing::debug;

/// Default fraction of skin-tone pixels a region must exceed
pub const DEFAULT_SKIN_PIXEL_FRACTION: f32 = 0.08;

/// Inclusive HSV band treated as skin tone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkinToneBand {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for SkinToneBand {
    fn default() -> Self {
        Self {
            lower: [0, 10, 60],
            upper: [40, 255, 255],
        }
    }
}

impl SkinToneBand {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// Skin filter parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SkinFilterConfig {
    pub band: SkinToneBand,
    /// Acceptance requires a strictly larger skin fraction than this
    pub min_skin_fraction: f32,
}

impl Default for SkinFilterConfig {
    fn default() -> Self {
        Self {
            band: SkinToneBand::default(),
            min_skin_fraction: DEFAULT_SKIN_PIXEL_FRACTION,
        }
    }
}

/// Convert an RGB pixel to 8-bit HSV (H in `[0, 180)`, S and V in `[0, 255]`)
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let hue = if delta <= f32::EPSILON {
        0.0
    } else if max == rf {
        60.0 * ((gf - bf) / delta)
    } else if max == gf {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };
    let hue = if hue < 0.0 { hue + 360.0 } else { hue };

    let saturation = if max <= f32::EPSILON { 0.0 } else { delta / max };

    let h = ((hue / 2.0).round() as u32 % 180) as u8;
    let s = (saturation * 255.0).round().clamp(0.0, 255.0) as u8;
    let v = (max * 255.0).round().clamp(0.0, 255.0) as u8;
    [h, s, v]
}

/// Fraction of pixels in `region` that fall inside `band`
///
/// `None` for an empty region.
pub fn skin_fraction(region: &RgbImage, band: &SkinToneBand) -> Option<f32> {
    let total = region.width() as u64 * region.height() as u64;
    if total == 0 {
        return None;
    }

    let skin = region
        .pixels()
        .filter(|p| band.contains(rgb_to_hsv(p[0], p[1], p[2])))
        .count() as u64;

    Some(skin as f32 / total as f32)
}

/// Whether `region` plausibly shows skin
///
/// Fails closed: a region that cannot be measured is not skin.
pub fn looks_like_skin(region: &RgbImage, config: &SkinFilterConfig) -> bool {
    match skin_fraction(region, &config.band) {
        Some(fraction) => {
            debug!(
                "Skin-tone fraction {:.3} (threshold {:.3})",
                fraction, config.min_skin_fraction
            );
            fraction > config.min_skin_fraction
        }
        None => false,
    }
}
