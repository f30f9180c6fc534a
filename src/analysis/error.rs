// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the analysis pipeline

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image_utils::ImageError;

/// Failure raised inside the pipeline before it is folded into a
/// [`PredictionResult`](super::result::PredictionResult)
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("models not loaded")]
    ModelsNotLoaded,

    #[error("could not read image")]
    ImageUnreadable {
        #[source]
        source: ImageError,
    },

    #[error("image too small for analysis")]
    ImageTooSmall { width: u32, height: u32 },

    #[error("Unexpected error during prediction: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl AnalysisError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AnalysisError::ModelsNotLoaded => FailureKind::StartupFailure,
            AnalysisError::ImageUnreadable { .. } | AnalysisError::ImageTooSmall { .. } => {
                FailureKind::InputFailure
            }
            AnalysisError::Unexpected(_) => FailureKind::UnexpectedFailure,
        }
    }
}

impl From<ImageError> for AnalysisError {
    fn from(source: ImageError) -> Self {
        AnalysisError::ImageUnreadable { source }
    }
}

/// Coarse failure taxonomy reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A classifier or the detector failed to load; only a restart helps
    StartupFailure,
    /// Unreadable or undersized image; the caller can fix it
    InputFailure,
    /// Anything else during detection, preprocessing or inference
    UnexpectedFailure,
}
