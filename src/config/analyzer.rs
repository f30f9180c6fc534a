// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyzer configuration loaded from environment variables

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::analysis::{
    ConfidenceThresholds, DetectorConfig, ModelPaths, PipelineConfig, RegionConfig,
    SkinFilterConfig, TensorLayout,
};

/// Default ONNX Runtime intra-op thread count
pub const DEFAULT_INTRA_THREADS: usize = 4;

/// Everything needed to load the models and run the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Model artifact locations
    pub models: ModelPaths,
    /// Face detector tuning
    pub detector: DetectorConfig,
    /// Region, filter, threshold and tensor policy
    pub pipeline: PipelineConfig,
    /// ONNX Runtime intra-op threads per classifier
    pub intra_threads: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            models: ModelPaths::default(),
            detector: DetectorConfig::default(),
            pipeline: PipelineConfig::default(),
            intra_threads: DEFAULT_INTRA_THREADS,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    ///
    /// Unset variables keep their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let models = ModelPaths {
            skin_model: get("SKIN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.models.skin_model),
            acne_model: get("ACNE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.models.acne_model),
            face_model: get("FACE_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.models.face_model),
        };

        let detector = DetectorConfig {
            min_face_size: parse_or(&get, "FACE_MIN_SIZE", defaults.detector.min_face_size)?,
            scale_step: parse_or(&get, "FACE_SCALE_STEP", defaults.detector.scale_step)?,
            score_threshold: parse_or(
                &get,
                "FACE_SCORE_THRESHOLD",
                defaults.detector.score_threshold,
            )?,
            window_step: parse_or(&get, "FACE_WINDOW_STEP", defaults.detector.window_step)?,
        };

        let pipeline = PipelineConfig {
            region: RegionConfig {
                face_padding_ratio: parse_or(
                    &get,
                    "FACE_PADDING_RATIO",
                    defaults.pipeline.region.face_padding_ratio,
                )?,
                center_crop_fraction: parse_or(
                    &get,
                    "CENTER_CROP_FRACTION",
                    defaults.pipeline.region.center_crop_fraction,
                )?,
                min_image_dimension: parse_or(
                    &get,
                    "MIN_IMAGE_DIMENSION",
                    defaults.pipeline.region.min_image_dimension,
                )?,
            },
            skin_filter: SkinFilterConfig {
                band: defaults.pipeline.skin_filter.band,
                min_skin_fraction: parse_or(
                    &get,
                    "SKIN_PIXEL_FRACTION",
                    defaults.pipeline.skin_filter.min_skin_fraction,
                )?,
            },
            thresholds: ConfidenceThresholds {
                skin: parse_or(
                    &get,
                    "SKIN_CONFIDENCE_THRESHOLD",
                    defaults.pipeline.thresholds.skin,
                )?,
                acne: parse_or(
                    &get,
                    "ACNE_CONFIDENCE_THRESHOLD",
                    defaults.pipeline.thresholds.acne,
                )?,
                acne_without_face: parse_or(
                    &get,
                    "ACNE_NO_FACE_THRESHOLD",
                    defaults.pipeline.thresholds.acne_without_face,
                )?,
            },
            layout: parse_or::<TensorLayout, _>(&get, "TENSOR_LAYOUT", defaults.pipeline.layout)?,
        };

        let config = Self {
            models,
            detector,
            pipeline,
            intra_threads: parse_or(&get, "ONNX_INTRA_THREADS", defaults.intra_threads)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.detector.validate().context("Invalid face detector settings")?;
        self.pipeline
            .region
            .validate()
            .context("Invalid region settings")?;
        self.pipeline
            .thresholds
            .validate()
            .context("Invalid confidence thresholds")?;
        let fraction = self.pipeline.skin_filter.min_skin_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            anyhow::bail!("SKIN_PIXEL_FRACTION must be within [0.0, 1.0], got {}", fraction);
        }
        if self.intra_threads == 0 {
            anyhow::bail!("ONNX_INTRA_THREADS must be greater than 0");
        }
        Ok(())
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}
