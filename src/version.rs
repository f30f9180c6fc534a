// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the skin analyzer

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-dual-classifier-2025-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "face-detection",
    "center-crop-fallback",
    "skin-tone-filter",
    "skin-type-classification",
    "acne-severity-classification",
    "confidence-gating",
    "batch-classification",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Skin Analyzer {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info as JSON
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
