// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pipeline output contract

use serde::{Deserialize, Serialize};

use super::error::{AnalysisError, FailureKind};
use super::labels::{AcneType, SkinType};
use super::resolver::Resolution;

/// Guidance returned when neither a face nor skin could be found
pub const NO_SUBJECT_MESSAGE: &str =
    "No face or valid skin detected. Please upload a clear image of your facial skin.";

/// A completed classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinAnalysis {
    pub skin_type: SkinType,
    /// Raw arg-max probability of the skin model, even when the label is `uncertain`
    pub skin_confidence: f32,
    pub acne_type: AcneType,
    /// Raw arg-max probability of the acne model, even when the label is `no_acne`
    pub acne_confidence: f32,
    pub face_detected: bool,
}

impl SkinAnalysis {
    pub fn from_resolution(resolution: Resolution, face_detected: bool) -> Self {
        Self {
            skin_type: resolution.skin_type,
            skin_confidence: resolution.skin_confidence,
            acne_type: resolution.acne_type,
            acne_confidence: resolution.acne_confidence,
            face_detected,
        }
    }
}

/// Outcome of one `classify` call
///
/// Callers only need to branch on these three shapes; which stage failed is
/// folded into [`FailureKind`] and the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionResult {
    Success(SkinAnalysis),
    /// Valid image, but nothing worth classifying. Labels are unknown (`None`)
    /// and confidences zero.
    NoSubjectDetected {
        message: String,
        skin_type: Option<SkinType>,
        skin_confidence: f32,
        acne_type: Option<AcneType>,
        acne_confidence: f32,
        face_detected: bool,
    },
    Error {
        kind: FailureKind,
        message: String,
    },
}

impl PredictionResult {
    pub fn no_subject() -> Self {
        PredictionResult::NoSubjectDetected {
            message: NO_SUBJECT_MESSAGE.to_string(),
            skin_type: None,
            skin_confidence: 0.0,
            acne_type: None,
            acne_confidence: 0.0,
            face_detected: false,
        }
    }

    pub fn error(kind: FailureKind, message: impl Into<String>) -> Self {
        PredictionResult::Error {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PredictionResult::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PredictionResult::Error { .. })
    }

    /// The analysis, if the call succeeded
    pub fn analysis(&self) -> Option<&SkinAnalysis> {
        match self {
            PredictionResult::Success(analysis) => Some(analysis),
            _ => None,
        }
    }

    /// User-facing message for the non-success shapes
    pub fn message(&self) -> Option<&str> {
        match self {
            PredictionResult::Success(_) => None,
            PredictionResult::NoSubjectDetected { message, .. }
            | PredictionResult::Error { message, .. } => Some(message),
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            PredictionResult::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn face_detected(&self) -> bool {
        match self {
            PredictionResult::Success(analysis) => analysis.face_detected,
            _ => false,
        }
    }
}

impl From<AnalysisError> for PredictionResult {
    fn from(err: AnalysisError) -> Self {
        PredictionResult::error(err.kind(), err.to_string())
    }
}
