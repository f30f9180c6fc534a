// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Skin-type and acne-severity classifiers
//!
//! Each classifier maps the preprocessed region tensor to a probability
//! distribution over its fixed label set. The production backend runs an
//! ONNX Runtime session on CPU.

use anyhow::{Context, Result};
use ndarray::Array4;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::labels::{AcneType, SkinType};

/// Tolerance on individual probabilities falling outside `[0, 1]`
const PROBABILITY_TOLERANCE: f32 = 1e-4;

/// Distance from 1.0 at which a distribution's sum is reported
const SUM_TOLERANCE: f32 = 1e-2;

/// A pretrained image classifier
pub trait Classifier: Send + Sync {
    /// Run the model on a `[1, ...]` input tensor and return its raw output row
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>>;
}

/// Validated probability vector over a label set
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    probabilities: Vec<f32>,
}

impl Distribution {
    /// Check `probabilities` against the expected label-set size
    ///
    /// Every value must be finite and within `[0, 1]`. A sum that drifts from
    /// 1.0 is only logged: the confidence reported is the raw value either way.
    pub fn new(probabilities: Vec<f32>, expected_len: usize) -> Result<Self> {
        if probabilities.len() != expected_len {
            anyhow::bail!(
                "classifier returned {} probabilities, expected {}",
                probabilities.len(),
                expected_len
            );
        }

        for (i, p) in probabilities.iter().enumerate() {
            if !p.is_finite() || *p < -PROBABILITY_TOLERANCE || *p > 1.0 + PROBABILITY_TOLERANCE {
                anyhow::bail!("classifier returned invalid probability {} at index {}", p, i);
            }
        }

        let sum: f32 = probabilities.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            warn!("Classifier probabilities sum to {:.4}, expected 1.0", sum);
        }

        Ok(Self { probabilities })
    }

    /// Index and value of the highest probability (first one on ties)
    pub fn arg_max(&self) -> (usize, f32) {
        let mut best = (0, self.probabilities[0]);
        for (i, &p) in self.probabilities.iter().enumerate().skip(1) {
            if p > best.1 {
                best = (i, p);
            }
        }
        (best.0, best.1.clamp(0.0, 1.0))
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }
}

/// ONNX Runtime classifier
///
/// Runs on CPU only. The session is shared behind a mutex because running it
/// needs exclusive access.
#[derive(Clone)]
pub struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    name: String,
    input_name: String,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load a classifier from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(
        name: impl Into<String>,
        model_path: P,
        intra_threads: usize,
    ) -> Result<Self> {
        let name = name.into();
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("{} model not found: {}", name, model_path.display());
        }

        info!("Loading {} model from {}", name, model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load {} model from {}",
                name,
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .context("Model declares no inputs")?;

        if let Some(input) = session.inputs.first() {
            debug!("{} model input shape: {:?}", name, input.input_type);
        }

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            name,
            input_name,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("{} session lock poisoned", self.name))?;

        let input_value =
            Value::from_array(input.to_owned()).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .with_context(|| format!("{} inference failed", self.name))?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        // Batch of one: the first row is the distribution.
        let row: Vec<f32> = output_tensor.iter().copied().collect();
        debug!("{} output: {:?}", self.name, row);

        Ok(row)
    }
}

/// Raw distributions from both classifiers for one region
#[derive(Debug, Clone, PartialEq)]
pub struct DualPrediction {
    pub skin: Distribution,
    pub acne: Distribution,
}

/// The skin-type and acne-severity classifiers, run against the same tensor
#[derive(Clone)]
pub struct DualClassifier {
    skin: Arc<dyn Classifier>,
    acne: Arc<dyn Classifier>,
}

impl DualClassifier {
    pub fn new(skin: Arc<dyn Classifier>, acne: Arc<dyn Classifier>) -> Self {
        Self { skin, acne }
    }

    /// Run the skin model, then the acne model
    ///
    /// A skin-model failure returns before the acne model is invoked.
    pub fn classify(&self, input: &Array4<f32>) -> Result<DualPrediction> {
        let skin = self
            .skin
            .predict(input)
            .and_then(|row| Distribution::new(row, SkinType::CLASSES.len()))
            .context("skin-type classification failed")?;

        let acne = self
            .acne
            .predict(input)
            .and_then(|row| Distribution::new(row, AcneType::CLASSES.len()))
            .context("acne-severity classification failed")?;

        Ok(DualPrediction { skin, acne })
    }
}
