// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classification pipeline
//!
//! Stages, in order: loaded-check, decode, detect, select region, skin filter
//! (center crops only), preprocess, classify, resolve. Every path ends in one
//! [`PredictionResult`]; nothing escapes `classify`, not even a panic from a
//! detector or classifier backend.

use image::{imageops, DynamicImage, RgbImage};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::classifier::{Classifier, DualClassifier};
use super::error::AnalysisError;
use super::face_locator::FaceLocator;
use super::image_utils::load_image;
use super::model_manager::ModelManager;
use super::preprocessing::{prepare, TensorLayout};
use super::region::{select_region, RegionConfig};
use super::resolver::{resolve, ConfidenceThresholds};
use super::result::{PredictionResult, SkinAnalysis};
use super::skin_filter::{looks_like_skin, SkinFilterConfig};

/// Per-request policy shared by every invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineConfig {
    pub region: RegionConfig,
    pub skin_filter: SkinFilterConfig,
    pub thresholds: ConfidenceThresholds,
    pub layout: TensorLayout,
}

/// Models the pipeline needs; all present or the analyzer is degraded
#[derive(Clone)]
struct LoadedModels {
    locator: Arc<dyn FaceLocator>,
    classifiers: DualClassifier,
}

/// Skin-type and acne-severity analyzer
///
/// Built once at startup and shared (`Arc<SkinAnalyzer>`) by every request.
/// Nothing inside is mutated after construction.
#[derive(Clone)]
pub struct SkinAnalyzer {
    models: Option<LoadedModels>,
    config: PipelineConfig,
}

impl std::fmt::Debug for SkinAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkinAnalyzer")
            .field("ready", &self.is_ready())
            .field("config", &self.config)
            .finish()
    }
}

impl SkinAnalyzer {
    /// Build from the models a [`ModelManager`] loaded
    ///
    /// If any model is missing the analyzer is degraded.
    pub fn new(manager: &ModelManager, config: PipelineConfig) -> Self {
        let models = match (
            manager.face_locator(),
            manager.skin_model(),
            manager.acne_model(),
        ) {
            (Some(locator), Some(skin), Some(acne)) => Some(LoadedModels {
                locator,
                classifiers: DualClassifier::new(skin, acne),
            }),
            _ => None,
        };
        Self { models, config }
    }

    /// Build from explicit components, e.g. test doubles
    pub fn from_parts(
        locator: Arc<dyn FaceLocator>,
        skin: Arc<dyn Classifier>,
        acne: Arc<dyn Classifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            models: Some(LoadedModels {
                locator,
                classifiers: DualClassifier::new(skin, acne),
            }),
            config,
        }
    }

    /// An analyzer with no models; every request fails fast
    pub fn degraded(config: PipelineConfig) -> Self {
        Self {
            models: None,
            config,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.models.is_some()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Classify the image stored at `image_path`
    ///
    /// The file is only read; deleting it afterwards is up to the caller.
    pub fn classify<P: AsRef<Path>>(&self, image_path: P) -> PredictionResult {
        let image_path = image_path.as_ref();
        let started = Instant::now();

        let outcome = guarded(|| {
            let models = self.ready_models()?;
            let (image, info) = load_image(image_path)?;
            debug!(
                "Decoded {}: {}x{} {:?}, {} bytes",
                image_path.display(),
                info.width,
                info.height,
                info.format,
                info.size_bytes
            );
            self.analyze(models, &image.to_rgb8())
        });

        finish(outcome, started)
    }

    /// Classify an already decoded image
    pub fn classify_image(&self, image: &DynamicImage) -> PredictionResult {
        let started = Instant::now();
        let outcome = guarded(|| {
            let models = self.ready_models()?;
            self.analyze(models, &image.to_rgb8())
        });
        finish(outcome, started)
    }

    fn ready_models(&self) -> Result<&LoadedModels, AnalysisError> {
        self.models.as_ref().ok_or_else(|| {
            warn!("Classification requested but models are not loaded");
            AnalysisError::ModelsNotLoaded
        })
    }

    fn analyze(
        &self,
        models: &LoadedModels,
        image: &RgbImage,
    ) -> Result<PredictionResult, AnalysisError> {
        let gray = imageops::grayscale(image);
        let boxes = models.locator.locate(&gray);
        debug!("Detected {} face(s)", boxes.len());

        let region = select_region(image, &boxes, &self.config.region)?;
        let face_detected = region.used_face;

        if !face_detected && !looks_like_skin(&region.image, &self.config.skin_filter) {
            info!("No face and no skin-like center region");
            return Ok(PredictionResult::no_subject());
        }

        let tensor = prepare(&region.image, self.config.layout);
        let prediction = models.classifiers.classify(&tensor)?;
        let resolution = resolve(&prediction, face_detected, &self.config.thresholds);

        Ok(PredictionResult::Success(SkinAnalysis::from_resolution(
            resolution,
            face_detected,
        )))
    }
}

/// Run `stage`, turning a panic inside it into an unexpected failure
fn guarded<F>(stage: F) -> Result<PredictionResult, AnalysisError>
where
    F: FnOnce() -> Result<PredictionResult, AnalysisError>,
{
    match catch_unwind(AssertUnwindSafe(stage)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(AnalysisError::Unexpected(anyhow::anyhow!(
            "panic in analysis backend: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

fn finish(outcome: Result<PredictionResult, AnalysisError>, started: Instant) -> PredictionResult {
    let elapsed_ms = started.elapsed().as_millis();
    match outcome {
        Ok(result) => {
            if let Some(analysis) = result.analysis() {
                info!(
                    "Classified skin={} ({:.2}) acne={} ({:.2}) face={} in {}ms",
                    analysis.skin_type,
                    analysis.skin_confidence,
                    analysis.acne_type,
                    analysis.acne_confidence,
                    analysis.face_detected,
                    elapsed_ms
                );
            }
            result
        }
        Err(err) => {
            match &err {
                AnalysisError::Unexpected(source) => {
                    error!("Prediction failed after {}ms: {:#}", elapsed_ms, source)
                }
                AnalysisError::ImageUnreadable { source } => {
                    warn!("Could not read image: {}", source)
                }
                other => warn!("Prediction rejected: {}", other),
            }
            err.into()
        }
    }
}
