// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Configuration flowing into the pipeline

use super::support::*;
use skin_analyzer::analysis::{SkinAnalyzer, SkinType, TensorLayout};
use skin_analyzer::AnalyzerConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;

fn from_pairs(pairs: &[(&str, &str)]) -> anyhow::Result<AnalyzerConfig> {
    let map: HashMap<&str, &str> = pairs.iter().copied().collect();
    AnalyzerConfig::from_lookup(|key| map.get(key).map(|v| v.to_string()))
}

#[test]
fn test_defaults_without_environment() {
    let config = from_pairs(&[]).unwrap();
    assert_eq!(config, AnalyzerConfig::default());
    assert_eq!(config.pipeline.layout, TensorLayout::Nhwc);
    assert_eq!(config.intra_threads, 4);
}

#[test]
fn test_blank_values_keep_defaults() {
    let config = from_pairs(&[("SKIN_CONFIDENCE_THRESHOLD", "  ")]).unwrap();
    assert_eq!(config.pipeline.thresholds.skin, 0.30);
}

#[test]
fn test_configured_threshold_changes_labels() {
    let config = from_pairs(&[("SKIN_CONFIDENCE_THRESHOLD", "0.9")]).unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));

    let analyzer = SkinAnalyzer::from_parts(
        Arc::new(FixedLocator(vec![face_box()])),
        Arc::new(FixedClassifier(vec![0.1, 0.8, 0.1])),
        Arc::new(FixedClassifier(vec![0.05, 0.1, 0.75, 0.05, 0.05])),
        config.pipeline,
    );

    let result = analyzer.classify(&path);
    let analysis = result.analysis().expect("success");
    assert_eq!(analysis.skin_type, SkinType::Uncertain);
    assert_eq!(analysis.skin_confidence, 0.8);
}

#[test]
fn test_configured_minimum_dimension() {
    let config = from_pairs(&[("MIN_IMAGE_DIMENSION", "20")]).unwrap();

    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "tiny.png", &solid(50, 50, SKIN_TONE));

    let analyzer = SkinAnalyzer::from_parts(
        Arc::new(FixedLocator(vec![])),
        Arc::new(FixedClassifier(vec![0.1, 0.8, 0.1])),
        Arc::new(FixedClassifier(vec![0.05, 0.1, 0.75, 0.05, 0.05])),
        config.pipeline,
    );
    assert!(analyzer.classify(&path).is_success());
}

#[test]
fn test_invalid_layout_is_rejected() {
    let err = from_pairs(&[("TENSOR_LAYOUT", "chwn")]).unwrap_err();
    assert!(err.to_string().contains("TENSOR_LAYOUT"));
}

#[test]
fn test_invalid_scale_step_is_rejected() {
    assert!(from_pairs(&[("FACE_SCALE_STEP", "1.0")]).is_err());
    assert!(from_pairs(&[("FACE_SCALE_STEP", "1.25")]).is_ok());
}
