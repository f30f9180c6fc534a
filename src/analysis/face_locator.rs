// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Face localization over grayscale images
//!
//! The production backend is the SeetaFace funnel cascade shipped by the
//! `rustface` crate: a multi-scale sliding-window detector that needs no GPU.
//! Detection never fails loudly; a detector problem yields no boxes.

use anyhow::{Context, Result};
use image::GrayImage;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Default minimum detectable face side, in pixels
pub const DEFAULT_MIN_FACE_SIZE: u32 = 30;

/// Default ratio between successive pyramid scales
pub const DEFAULT_SCALE_STEP: f32 = 1.05;

/// Default acceptance score for a candidate window
pub const DEFAULT_SCORE_THRESHOLD: f64 = 2.0;

/// Default sliding-window stride, in pixels
pub const DEFAULT_WINDOW_STEP: u32 = 4;

/// Axis-aligned face box in source-image pixel coordinates
///
/// `x` and `y` are signed: the detector can report windows that start just
/// outside the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Detector score (higher is more face-like)
    pub score: f64,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score: 0.0,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Detector tuning knobs
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Smallest face side the detector will report
    pub min_face_size: u32,
    /// Scale ratio between pyramid levels (> 1.0)
    pub scale_step: f32,
    /// Minimum window score for a detection to be kept
    pub score_threshold: f64,
    /// Sliding-window stride in both axes
    pub window_step: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_face_size: DEFAULT_MIN_FACE_SIZE,
            scale_step: DEFAULT_SCALE_STEP,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            window_step: DEFAULT_WINDOW_STEP,
        }
    }
}

impl DetectorConfig {
    /// Pyramid shrink factor applied between levels
    pub fn pyramid_scale_factor(&self) -> f32 {
        1.0 / self.scale_step
    }

    /// Check the values against what the detector accepts
    pub fn validate(&self) -> Result<()> {
        if self.min_face_size < 20 {
            anyhow::bail!(
                "min_face_size must be at least 20 pixels, got {}",
                self.min_face_size
            );
        }
        let factor = self.pyramid_scale_factor();
        if !factor.is_finite() || !(0.01..=0.99).contains(&factor) {
            anyhow::bail!(
                "scale_step must be between 1.0101 and 100, got {}",
                self.scale_step
            );
        }
        if self.window_step == 0 {
            anyhow::bail!("window_step must be > 0");
        }
        Ok(())
    }
}

/// Pluggable face detection backend
pub trait FaceLocator: Send + Sync {
    /// Return every face found in `gray`, possibly none
    fn locate(&self, gray: &GrayImage) -> Vec<BoundingBox>;
}

/// Face locator backed by the `rustface` crate (SeetaFace engine)
pub struct RustfaceLocator {
    model: rustface::Model,
    config: DetectorConfig,
}

impl std::fmt::Debug for RustfaceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustfaceLocator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RustfaceLocator {
    /// Load the SeetaFace model file from disk
    pub fn new<P: AsRef<Path>>(model_path: P, config: DetectorConfig) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Face detector model not found: {}", model_path.display());
        }
        config.validate().context("Invalid face detector configuration")?;

        info!("Loading face detector model from {}", model_path.display());

        let file = File::open(model_path)
            .with_context(|| format!("Failed to open {}", model_path.display()))?;
        let model = rustface::read_model(BufReader::new(file)).with_context(|| {
            format!(
                "Failed to parse face detector model from {}",
                model_path.display()
            )
        })?;

        Ok(Self { model, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl FaceLocator for RustfaceLocator {
    fn locate(&self, gray: &GrayImage) -> Vec<BoundingBox> {
        let (width, height) = gray.dimensions();
        if width < self.config.min_face_size || height < self.config.min_face_size {
            return Vec::new();
        }

        // The detector keeps per-scan state, so each call gets its own.
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(self.config.score_threshold);
        detector.set_pyramid_scale_factor(self.config.pyramid_scale_factor());
        detector.set_slide_window_step(self.config.window_step, self.config.window_step);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        let boxes: Vec<BoundingBox> = faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                BoundingBox {
                    x: bbox.x(),
                    y: bbox.y(),
                    width: bbox.width(),
                    height: bbox.height(),
                    score: face.score(),
                }
            })
            .filter(BoundingBox::is_valid)
            .collect();

        debug!("Face locator found {} candidate(s)", boxes.len());
        boxes
    }
}
