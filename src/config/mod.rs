// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runtime configuration

pub mod analyzer;

pub use analyzer::AnalyzerConfig;
