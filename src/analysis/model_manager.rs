// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Startup loading of the classifiers and the face detector

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::classifier::OnnxClassifier;
use super::face_locator::{DetectorConfig, RustfaceLocator};

/// Model artifact locations
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    /// Skin-type classifier (ONNX)
    pub skin_model: PathBuf,
    /// Acne-severity classifier (ONNX)
    pub acne_model: PathBuf,
    /// SeetaFace frontal face detector model
    pub face_model: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            skin_model: PathBuf::from("./model/skin_model.onnx"),
            acne_model: PathBuf::from("./model/acne_model.onnx"),
            face_model: PathBuf::from("./model/seeta_fd_frontal_v1.0.bin"),
        }
    }
}

/// Information about a loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Model name
    pub name: String,
    /// Model type (classifier, detector)
    pub model_type: String,
    /// Where it was loaded from
    pub path: PathBuf,
    /// Whether the model is available
    pub available: bool,
}

/// Owner of the process-wide models
///
/// Each model loads independently; a failure is logged and leaves that slot
/// empty instead of aborting startup. The analyzer built from a manager with
/// any empty slot answers every request with "models not loaded".
pub struct ModelManager {
    paths: ModelPaths,
    skin_model: Option<Arc<OnnxClassifier>>,
    acne_model: Option<Arc<OnnxClassifier>>,
    face_locator: Option<Arc<RustfaceLocator>>,
}

impl ModelManager {
    /// Load every model listed in `paths`
    pub fn load(paths: ModelPaths, detector: DetectorConfig, intra_threads: usize) -> Self {
        let skin_model = match OnnxClassifier::new("skin-type", &paths.skin_model, intra_threads) {
            Ok(model) => {
                tracing::info!("✅ Skin-type model loaded from {}", paths.skin_model.display());
                Some(Arc::new(model))
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to load skin-type model: {:#}", e);
                None
            }
        };

        let acne_model = match OnnxClassifier::new("acne-severity", &paths.acne_model, intra_threads)
        {
            Ok(model) => {
                tracing::info!(
                    "✅ Acne-severity model loaded from {}",
                    paths.acne_model.display()
                );
                Some(Arc::new(model))
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to load acne-severity model: {:#}", e);
                None
            }
        };

        let face_locator = match RustfaceLocator::new(&paths.face_model, detector) {
            Ok(locator) => {
                tracing::info!("✅ Face detector loaded from {}", paths.face_model.display());
                Some(Arc::new(locator))
            }
            Err(e) => {
                tracing::warn!("⚠️ Failed to load face detector: {:#}", e);
                None
            }
        };

        let manager = Self {
            paths,
            skin_model,
            acne_model,
            face_locator,
        };
        if !manager.all_loaded() {
            tracing::warn!("Running degraded: classification requests will fail until restart");
        }
        manager
    }

    pub fn skin_model(&self) -> Option<Arc<OnnxClassifier>> {
        self.skin_model.clone()
    }

    pub fn acne_model(&self) -> Option<Arc<OnnxClassifier>> {
        self.acne_model.clone()
    }

    pub fn face_locator(&self) -> Option<Arc<RustfaceLocator>> {
        self.face_locator.clone()
    }

    /// True when every model loaded
    pub fn all_loaded(&self) -> bool {
        self.skin_model.is_some() && self.acne_model.is_some() && self.face_locator.is_some()
    }

    /// List all models and whether they are available
    pub fn list_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                name: "skin-type".to_string(),
                model_type: "classifier".to_string(),
                path: self.paths.skin_model.clone(),
                available: self.skin_model.is_some(),
            },
            ModelInfo {
                name: "acne-severity".to_string(),
                model_type: "classifier".to_string(),
                path: self.paths.acne_model.clone(),
                available: self.acne_model.is_some(),
            },
            ModelInfo {
                name: "face-detector".to_string(),
                model_type: "detector".to_string(),
                path: self.paths.face_model.clone(),
                available: self.face_locator.is_some(),
            },
        ]
    }
}
