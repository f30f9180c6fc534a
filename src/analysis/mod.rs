// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Skin-type and acne-severity analysis of facial photos
//!
//! This module provides:
//! - Face localization (SeetaFace via `rustface`) with a center-crop fallback
//! - A skin-tone heuristic gating center crops
//! - Dual ONNX classification (skin type, acne severity) with confidence gating
//!
//! Everything runs on CPU.

pub mod classifier;
pub mod error;
pub mod face_locator;
pub mod image_utils;
pub mod labels;
pub mod model_manager;
pub mod pipeline;
pub mod preprocessing;
pub mod region;
pub mod resolver;
pub mod result;
pub mod skin_filter;

pub use classifier::{Classifier, DualClassifier, DualPrediction, Distribution, OnnxClassifier};
pub use error::{AnalysisError, FailureKind};
pub use face_locator::{BoundingBox, DetectorConfig, FaceLocator, RustfaceLocator};
pub use image_utils::{load_image, ImageError, ImageInfo, MAX_IMAGE_SIZE};
pub use labels::{AcneType, SkinType};
pub use model_manager::{ModelInfo, ModelManager, ModelPaths};
pub use pipeline::{PipelineConfig, SkinAnalyzer};
pub use preprocessing::{prepare, TensorLayout, MODEL_INPUT_SIZE};
pub use region::{select_region, CropRect, Region, RegionConfig};
pub use resolver::{resolve, ConfidenceThresholds, Resolution};
pub use result::{PredictionResult, SkinAnalysis, NO_SUBJECT_MESSAGE};
pub use skin_filter::{looks_like_skin, SkinFilterConfig, SkinToneBand};
