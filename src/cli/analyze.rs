// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::analysis::{FailureKind, ModelManager, PredictionResult, SkinAnalyzer};
use crate::config::AnalyzerConfig;

/// Model path overrides shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Skin-type ONNX model (overrides SKIN_MODEL_PATH)
    #[arg(long, global = true)]
    pub skin_model: Option<PathBuf>,

    /// Acne-severity ONNX model (overrides ACNE_MODEL_PATH)
    #[arg(long, global = true)]
    pub acne_model: Option<PathBuf>,

    /// SeetaFace detector model (overrides FACE_MODEL_PATH)
    #[arg(long, global = true)]
    pub face_model: Option<PathBuf>,
}

impl ModelArgs {
    /// Apply the overrides on top of an environment-derived config
    pub fn apply(&self, config: &mut AnalyzerConfig) {
        if let Some(path) = &self.skin_model {
            config.models.skin_model = path.clone();
        }
        if let Some(path) = &self.acne_model {
            config.models.acne_model = path.clone();
        }
        if let Some(path) = &self.face_model {
            config.models.face_model = path.clone();
        }
    }
}

/// Arguments for the classify command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file to classify
    pub image: PathBuf,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Image files to classify
    #[arg(required = true)]
    pub images: Vec<PathBuf>,
}

/// Resolve the configuration for this invocation
pub fn load_config(overrides: &ModelArgs) -> Result<AnalyzerConfig> {
    dotenv::dotenv().ok();

    let mut config = AnalyzerConfig::from_env().context("Invalid analyzer configuration")?;
    overrides.apply(&mut config);
    Ok(config)
}

/// Load the models off the async runtime
async fn load_models(config: AnalyzerConfig) -> Result<(ModelManager, SkinAnalyzer)> {
    tokio::task::spawn_blocking(move || {
        let manager = ModelManager::load(config.models, config.detector, config.intra_threads);
        let analyzer = SkinAnalyzer::new(&manager, config.pipeline);
        (manager, analyzer)
    })
    .await
    .context("Model loading task failed")
}

/// Classify one image
pub async fn classify(overrides: &ModelArgs, args: ClassifyArgs) -> Result<()> {
    let config = load_config(overrides)?;
    let (_manager, analyzer) = load_models(config).await?;

    let analyzer = Arc::new(analyzer);
    let image = args.image.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.classify(&image))
        .await
        .context("Classification task failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    match result {
        PredictionResult::Error { message, .. } => Err(anyhow!(
            "classification of {} failed: {}",
            args.image.display(),
            message
        )),
        _ => Ok(()),
    }
}

/// Classify several images concurrently; output keeps the input order
pub async fn batch(overrides: &ModelArgs, args: BatchArgs) -> Result<()> {
    let config = load_config(overrides)?;
    let (_manager, analyzer) = load_models(config).await?;
    let analyzer = Arc::new(analyzer);

    info!("Classifying {} images", args.images.len());

    let handles: Vec<_> = args
        .images
        .into_iter()
        .map(|path| {
            let analyzer = Arc::clone(&analyzer);
            let task_path = path.clone();
            let handle = tokio::task::spawn_blocking(move || analyzer.classify(&task_path));
            (path, handle)
        })
        .collect();

    let mut failed = 0usize;
    for (path, handle) in handles {
        // One failed task must not drop the remaining results
        let result = handle.await.unwrap_or_else(|e| {
            error!("Classification task for {} failed: {}", path.display(), e);
            PredictionResult::error(
                FailureKind::UnexpectedFailure,
                format!("Unexpected error during prediction: {}", e),
            )
        });
        if result.is_error() {
            failed += 1;
        }
        let line = serde_json::json!({
            "path": path,
            "result": result,
        });
        println!("{}", serde_json::to_string(&line)?);
    }

    if failed > 0 {
        info!("{} image(s) could not be classified", failed);
    }
    Ok(())
}

/// Report per-model availability
pub async fn models(overrides: &ModelArgs) -> Result<()> {
    let config = load_config(overrides)?;
    let (manager, analyzer) = load_models(config).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&models_report(&manager, &analyzer))?
    );
    Ok(())
}

/// Build, version and per-model availability as JSON
pub fn models_report(manager: &ModelManager, analyzer: &SkinAnalyzer) -> serde_json::Value {
    serde_json::json!({
        "version": crate::version::get_version_info(),
        "ready": analyzer.is_ready(),
        "models": manager.list_models(),
    })
}
