// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Confidence-gated label resolution

use super::classifier::DualPrediction;
use super::labels::{AcneType, SkinType};

/// Default minimum skin-type confidence
pub const DEFAULT_SKIN_THRESHOLD: f32 = 0.30;

/// Default minimum acne-severity confidence
pub const DEFAULT_ACNE_THRESHOLD: f32 = 0.30;

/// Default minimum acne-severity confidence when no face was located
pub const DEFAULT_ACNE_NO_FACE_THRESHOLD: f32 = 0.60;

/// Threshold policy applied to raw predictions
///
/// All comparisons are strict: a probability equal to a threshold passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceThresholds {
    /// Below this the skin label becomes `uncertain`
    pub skin: f32,
    /// Below this the acne label becomes `no_acne`
    pub acne: f32,
    /// Below this the acne label becomes `no_acne` when the region is a
    /// center crop rather than a located face
    pub acne_without_face: f32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            skin: DEFAULT_SKIN_THRESHOLD,
            acne: DEFAULT_ACNE_THRESHOLD,
            acne_without_face: DEFAULT_ACNE_NO_FACE_THRESHOLD,
        }
    }
}

impl ConfidenceThresholds {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("skin", self.skin),
            ("acne", self.acne),
            ("acne_without_face", self.acne_without_face),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} threshold must be within [0.0, 1.0], got {}", name, value);
            }
        }
        Ok(())
    }
}

/// Final labels plus the raw confidences they came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub skin_type: SkinType,
    pub skin_confidence: f32,
    pub acne_type: AcneType,
    pub acne_confidence: f32,
}

/// Apply `thresholds` to a raw prediction
///
/// Overridden labels keep the raw arg-max probability as their confidence.
pub fn resolve(
    prediction: &DualPrediction,
    face_detected: bool,
    thresholds: &ConfidenceThresholds,
) -> Resolution {
    let (skin_index, skin_confidence) = prediction.skin.arg_max();
    let (acne_index, acne_confidence) = prediction.acne.arg_max();

    let skin_type = if skin_confidence < thresholds.skin {
        SkinType::Uncertain
    } else {
        SkinType::from_index(skin_index).unwrap_or(SkinType::Uncertain)
    };

    let acne_type = if acne_confidence < thresholds.acne
        || (!face_detected && acne_confidence < thresholds.acne_without_face)
    {
        AcneType::NoAcne
    } else {
        AcneType::from_index(acne_index).unwrap_or(AcneType::NoAcne)
    };

    Resolution {
        skin_type,
        skin_confidence,
        acne_type,
        acne_confidence,
    }
}
