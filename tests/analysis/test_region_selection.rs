// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Region selection as seen by the classifiers

use super::support::*;
use image::{Rgb, RgbImage};
use skin_analyzer::analysis::{
    select_region, BoundingBox, CropRect, DetectorConfig, RegionConfig, RustfaceLocator,
};

/// Blue canvas with one skin-toned rectangle
fn canvas_with_patch(x: u32, y: u32, width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(400, 400, |px, py| {
        if px >= x && px < x + width && py >= y && py < y + height {
            SKIN_TONE
        } else {
            BLUE
        }
    })
}

#[test]
fn test_largest_of_several_faces_is_cropped() {
    let image = canvas_with_patch(150, 150, 200, 200);
    let boxes = [
        BoundingBox::new(10, 10, 40, 40),
        BoundingBox::new(150, 150, 200, 200),
        BoundingBox::new(20, 300, 60, 60),
    ];

    let region = select_region(&image, &boxes, &RegionConfig::default()).unwrap();

    assert!(region.used_face);
    // pad = 40 on every side
    assert_eq!(
        region.rect,
        CropRect {
            x: 110,
            y: 110,
            width: 280,
            height: 280
        }
    );
    // Center of the crop lies inside the patch
    assert_eq!(*region.image.get_pixel(145, 145), SKIN_TONE);
    // Padding pulls in some of the background
    assert_eq!(*region.image.get_pixel(0, 0), BLUE);
}

#[test]
fn test_box_entirely_outside_falls_back_to_center() {
    let image = canvas_with_patch(0, 0, 400, 400);
    let boxes = [BoundingBox::new(1000, 1000, 80, 80)];

    let region = select_region(&image, &boxes, &RegionConfig::default()).unwrap();

    assert!(!region.used_face);
    assert_eq!(
        region.rect,
        CropRect {
            x: 80,
            y: 80,
            width: 240,
            height: 240
        }
    );
}

#[test]
fn test_zero_padding_crops_exact_box() {
    let image = canvas_with_patch(100, 120, 80, 60);
    let config = RegionConfig {
        face_padding_ratio: 0.0,
        ..Default::default()
    };

    let region = select_region(&image, &[BoundingBox::new(100, 120, 80, 60)], &config).unwrap();

    assert_eq!(region.image.dimensions(), (80, 60));
    assert!(region.image.pixels().all(|p| *p == SKIN_TONE));
}

#[test]
fn test_custom_center_fraction() {
    let image = RgbImage::from_pixel(200, 100, Rgb([0, 0, 0]));
    let config = RegionConfig {
        center_crop_fraction: 0.5,
        ..Default::default()
    };

    let region = select_region(&image, &[], &config).unwrap();
    assert_eq!(
        region.rect,
        CropRect {
            x: 50,
            y: 25,
            width: 100,
            height: 50
        }
    );
}

#[test]
fn test_missing_detector_model_fails_to_load() {
    let err = RustfaceLocator::new("/nonexistent/seeta.bin", DetectorConfig::default())
        .unwrap_err();
    assert!(format!("{:#}", err).contains("seeta.bin"));
}

#[test]
fn test_detector_config_rejects_tiny_faces() {
    let config = DetectorConfig {
        min_face_size: 10,
        ..Default::default()
    };
    assert!(config.validate().is_err());
    assert!(DetectorConfig::default().validate().is_ok());
}
