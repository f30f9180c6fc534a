// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end pipeline tests over on-disk images
//!
//! Models are replaced by fakes; everything else (decode, region selection,
//! skin filter, preprocessing, resolution) is the production code.

use super::support::*;
use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skin_analyzer::analysis::{
    AcneType, BoundingBox, DetectorConfig, FailureKind, ModelManager, ModelPaths,
    PipelineConfig, PredictionResult, SkinAnalyzer, SkinType, NO_SUBJECT_MESSAGE,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_face_image_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));

    let result = confident_analyzer(vec![face_box()]).classify(&path);

    let analysis = result.analysis().expect("success");
    assert!(analysis.face_detected);
    assert_eq!(analysis.skin_type, SkinType::Normal);
    assert_eq!(analysis.skin_confidence, 0.8);
    assert_eq!(analysis.acne_type, AcneType::Moderate);
    assert_eq!(analysis.acne_confidence, 0.75);
}

#[test]
fn test_small_image_without_face_is_input_failure() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "tiny.png", &solid(50, 50, SKIN_TONE));

    let result = confident_analyzer(vec![]).classify(&path);

    assert_eq!(result.failure_kind(), Some(FailureKind::InputFailure));
    assert_eq!(result.message(), Some("image too small for analysis"));
}

#[test]
fn test_small_image_with_face_is_still_classified() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "tiny_face.png", &solid(60, 60, SKIN_TONE));

    let result = confident_analyzer(vec![BoundingBox::new(10, 10, 40, 40)]).classify(&path);

    assert!(result.is_success());
    assert!(result.face_detected());
}

#[test]
fn test_one_narrow_side_is_too_small() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "strip.png", &solid(800, 99, SKIN_TONE));

    let result = confident_analyzer(vec![]).classify(&path);
    assert_eq!(result.failure_kind(), Some(FailureKind::InputFailure));
}

#[test]
fn test_landscape_without_skin_is_no_subject() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "landscape.png", &landscape(640, 480));

    let result = confident_analyzer(vec![]).classify(&path);

    match result {
        PredictionResult::NoSubjectDetected {
            message,
            skin_type,
            skin_confidence,
            acne_type,
            acne_confidence,
            face_detected,
        } => {
            assert_eq!(message, NO_SUBJECT_MESSAGE);
            assert!(skin_type.is_none());
            assert!(acne_type.is_none());
            assert_eq!(skin_confidence, 0.0);
            assert_eq!(acne_confidence, 0.0);
            assert!(!face_detected);
        }
        other => panic!("expected NoSubjectDetected, got {:?}", other),
    }
}

#[test]
fn test_skin_center_crop_without_face_succeeds() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "cheek.png", &solid(300, 300, SKIN_TONE));

    let result = confident_analyzer(vec![]).classify(&path);

    let analysis = result.analysis().expect("success");
    assert!(!analysis.face_detected);
    assert_eq!(analysis.skin_type, SkinType::Normal);
    // 0.75 clears the no-face acne bar
    assert_eq!(analysis.acne_type, AcneType::Moderate);
}

#[test]
fn test_no_face_applies_stricter_acne_threshold() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "cheek.png", &solid(300, 300, SKIN_TONE));
    let acne = Arc::new(FixedClassifier(vec![0.1, 0.1, 0.1, 0.59, 0.11]));

    let without_face = analyzer(
        vec![],
        Arc::new(FixedClassifier(vec![0.1, 0.8, 0.1])),
        acne.clone(),
    )
    .classify(&path);
    let analysis = without_face.analysis().expect("success");
    assert_eq!(analysis.acne_type, AcneType::NoAcne);
    assert_eq!(analysis.acne_confidence, 0.59);

    let with_face = analyzer(
        vec![face_box()],
        Arc::new(FixedClassifier(vec![0.1, 0.8, 0.1])),
        acne,
    )
    .classify(&path);
    assert_eq!(with_face.analysis().unwrap().acne_type, AcneType::Severe);
}

#[test]
fn test_low_skin_confidence_keeps_raw_value() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));

    let result = analyzer(
        vec![face_box()],
        Arc::new(FixedClassifier(vec![0.29, 0.28, 0.27])),
        Arc::new(FixedClassifier(vec![0.8, 0.05, 0.05, 0.05, 0.05])),
    )
    .classify(&path);

    let analysis = result.analysis().expect("success");
    assert_eq!(analysis.skin_type, SkinType::Uncertain);
    assert_eq!(analysis.skin_confidence, 0.29);
    assert_eq!(analysis.acne_type, AcneType::NoAcne);
    assert_eq!(analysis.acne_confidence, 0.8);
}

#[test]
fn test_missing_file_is_unreadable() {
    let result = confident_analyzer(vec![]).classify("/nonexistent/photo.jpg");

    assert_eq!(result.failure_kind(), Some(FailureKind::InputFailure));
    assert_eq!(result.message(), Some("could not read image"));
}

#[test]
fn test_garbage_file_is_unreadable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.jpg");
    std::fs::write(&path, b"definitely not an image").unwrap();

    let result = confident_analyzer(vec![face_box()]).classify(&path);

    assert_eq!(result.failure_kind(), Some(FailureKind::InputFailure));
    assert_eq!(result.message(), Some("could not read image"));
}

#[test]
fn test_degraded_manager_reports_models_not_loaded() {
    let paths = ModelPaths {
        skin_model: PathBuf::from("/nonexistent/skin.onnx"),
        acne_model: PathBuf::from("/nonexistent/acne.onnx"),
        face_model: PathBuf::from("/nonexistent/face.bin"),
    };
    let manager = ModelManager::load(paths, DetectorConfig::default(), 1);
    let analyzer = SkinAnalyzer::new(&manager, PipelineConfig::default());
    assert!(!analyzer.is_ready());

    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));

    let result = analyzer.classify(&path);
    assert_eq!(result.failure_kind(), Some(FailureKind::StartupFailure));
    assert_eq!(result.message(), Some("models not loaded"));
}

#[test]
fn test_degraded_check_precedes_decode() {
    let analyzer = SkinAnalyzer::degraded(PipelineConfig::default());
    let result = analyzer.classify("/nonexistent/photo.jpg");
    assert_eq!(result.message(), Some("models not loaded"));
}

#[test]
fn test_classify_is_idempotent() {
    let mut rng = StdRng::seed_from_u64(42);
    let noisy = image::RgbImage::from_fn(320, 240, |_, _| {
        Rgb([
            rng.gen_range(150..=230),
            rng.gen_range(100..=170),
            rng.gen_range(80..=140),
        ])
    });

    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "noisy.png", &noisy);

    let analyzer = analyzer(
        vec![],
        Arc::new(MeanClassifier { classes: 3 }),
        Arc::new(MeanClassifier { classes: 5 }),
    );

    let first = analyzer.classify(&path);
    let second = analyzer.classify(&path);
    assert!(first.is_success(), "unexpected result: {:?}", first);
    assert_eq!(first, second);
}

#[test]
fn test_confidences_stay_in_unit_range() {
    let mut rng = StdRng::seed_from_u64(7);
    let dir = TempDir::new().unwrap();
    let analyzer = analyzer(
        vec![face_box()],
        Arc::new(MeanClassifier { classes: 3 }),
        Arc::new(MeanClassifier { classes: 5 }),
    );

    for i in 0..5 {
        let image = image::RgbImage::from_fn(400, 400, |_, _| {
            Rgb([rng.gen(), rng.gen(), rng.gen()])
        });
        let path = write_png(&dir, &format!("random_{}.png", i), &image);

        let result = analyzer.classify(&path);
        let analysis = result.analysis().expect("success");
        assert!((0.0..=1.0).contains(&analysis.skin_confidence));
        assert!((0.0..=1.0).contains(&analysis.acne_confidence));
        assert_eq!(analysis.skin_confidence, 0.7);
    }
}

#[test]
fn test_input_file_is_left_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));

    let _ = confident_analyzer(vec![face_box()]).classify(&path);
    assert!(path.exists());
}

#[test]
fn test_shared_analyzer_across_threads() {
    let dir = TempDir::new().unwrap();
    let face = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));
    let tiny = write_png(&dir, "tiny.png", &solid(40, 40, SKIN_TONE));

    let analyzer = Arc::new(confident_analyzer(vec![]));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let analyzer = Arc::clone(&analyzer);
            let path = if i % 2 == 0 { face.clone() } else { tiny.clone() };
            std::thread::spawn(move || (i, analyzer.classify(&path)))
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.join().unwrap();
        if i % 2 == 0 {
            assert!(result.is_success());
        } else {
            assert_eq!(result.failure_kind(), Some(FailureKind::InputFailure));
        }
    }
}

#[test]
fn test_success_json_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));

    let result = confident_analyzer(vec![face_box()]).classify(&path);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["status"], "success");
    assert_eq!(value["skin_type"], "normal");
    assert_eq!(value["acne_type"], "moderate");
    assert_eq!(value["face_detected"], true);
}

struct BrokenBackend;

impl skin_analyzer::analysis::Classifier for BrokenBackend {
    fn predict(&self, _input: &ndarray::Array4<f32>) -> anyhow::Result<Vec<f32>> {
        let row: Vec<f32> = Vec::new();
        Ok(vec![row[3]])
    }
}

#[test]
fn test_backend_panic_is_reported_not_propagated() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "face.png", &solid(400, 400, SKIN_TONE));
    let analyzer = analyzer(
        vec![face_box()],
        Arc::new(FixedClassifier(vec![0.1, 0.8, 0.1])),
        Arc::new(BrokenBackend),
    );

    let result = analyzer.classify(&path);

    assert_eq!(result.failure_kind(), Some(FailureKind::UnexpectedFailure));
    assert!(result
        .message()
        .unwrap()
        .starts_with("Unexpected error during prediction:"));

    // Later requests on the same analyzer still get answers
    let tiny = write_png(&dir, "tiny.png", &solid(50, 50, SKIN_TONE));
    assert_eq!(
        analyzer.classify(&tiny).message(),
        Some("image too small for analysis")
    );
}
