// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analysis;
pub mod cli;
pub mod config;
pub mod version;

// Re-export main types
pub use analysis::{
    AcneType, AnalysisError, FailureKind, ModelManager, PipelineConfig, PredictionResult,
    SkinAnalysis, SkinAnalyzer, SkinType,
};
pub use config::AnalyzerConfig;
