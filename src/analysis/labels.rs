// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Label sets produced by the skin-type and acne-severity classifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Skin-type category
///
/// `Dry`, `Normal` and `Oil` are the classifier's output classes, in model
/// output order. `Uncertain` is the sentinel used when the top class is not
/// confident enough to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    Dry,
    Normal,
    Oil,
    Uncertain,
}

impl SkinType {
    /// Model output classes, indexed the way the classifier emits them
    pub const CLASSES: [SkinType; 3] = [SkinType::Dry, SkinType::Normal, SkinType::Oil];

    /// Map a classifier output index to its label
    pub fn from_index(index: usize) -> Option<Self> {
        Self::CLASSES.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkinType::Dry => "dry",
            SkinType::Normal => "normal",
            SkinType::Oil => "oil",
            SkinType::Uncertain => "uncertain",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acne-severity category
///
/// All five variants are classifier outputs. `NoAcne` doubles as the sentinel
/// for low-confidence predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcneType {
    NoAcne,
    Mild,
    Moderate,
    Severe,
    VerySevere,
}

impl AcneType {
    /// Model output classes, indexed the way the classifier emits them
    pub const CLASSES: [AcneType; 5] = [
        AcneType::NoAcne,
        AcneType::Mild,
        AcneType::Moderate,
        AcneType::Severe,
        AcneType::VerySevere,
    ];

    /// Map a classifier output index to its label
    pub fn from_index(index: usize) -> Option<Self> {
        Self::CLASSES.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AcneType::NoAcne => "no_acne",
            AcneType::Mild => "mild",
            AcneType::Moderate => "moderate",
            AcneType::Severe => "severe",
            AcneType::VerySevere => "very_severe",
        }
    }
}

impl fmt::Display for AcneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
