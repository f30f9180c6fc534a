// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the skin and acne classifiers
//!
//! Both classifiers are MobileNetV2 fine-tunes, so the region is resized to
//! 224x224 and scaled into `[-1, 1]` the way the network was trained.

use image::{imageops, imageops::FilterType, RgbImage};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Classifier input resolution (square)
pub const MODEL_INPUT_SIZE: u32 = 224;

/// Tensor memory layout expected by the exported classifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TensorLayout {
    /// `[1, H, W, 3]`, the Keras export default
    #[default]
    Nhwc,
    /// `[1, 3, H, W]`
    Nchw,
}

impl FromStr for TensorLayout {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nhwc" => Ok(TensorLayout::Nhwc),
            "nchw" => Ok(TensorLayout::Nchw),
            other => anyhow::bail!("unsupported tensor layout '{}', expected nhwc or nchw", other),
        }
    }
}

/// MobileNetV2 input scaling: `[0, 255]` → `[-1, 1]`
#[inline]
pub fn mobilenet_v2_scale(value: u8) -> f32 {
    value as f32 / 127.5 - 1.0
}

/// Build the classifier input tensor for a region
///
/// Steps:
/// 1. Bilinear resize to MODEL_INPUT_SIZE x MODEL_INPUT_SIZE (aspect ratio is not kept)
/// 2. Scale each channel with [`mobilenet_v2_scale`]
/// 3. Lay out as a batch of one in `layout` order
pub fn prepare(region: &RgbImage, layout: TensorLayout) -> Array4<f32> {
    let size = MODEL_INPUT_SIZE as usize;
    let resized = if region.dimensions() == (MODEL_INPUT_SIZE, MODEL_INPUT_SIZE) {
        region.clone()
    } else {
        imageops::resize(region, MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, FilterType::Triangle)
    };

    let shape = match layout {
        TensorLayout::Nhwc => (1, size, size, 3),
        TensorLayout::Nchw => (1, 3, size, size),
    };
    let mut tensor = Array4::zeros(shape);

    for (x, y, pixel) in resized.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            let value = mobilenet_v2_scale(pixel[c]);
            match layout {
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
            }
        }
    }

    tensor
}
