// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Skin Analyzer CLI
#[derive(Parser, Debug)]
#[command(name = "skin-analyzer")]
#[command(version = crate::version::VERSION_NUMBER)]
#[command(about = "Skin-type and acne-severity classification of facial photos", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub models: analyze::ModelArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a single image and print the result as JSON
    Classify(analyze::ClassifyArgs),

    /// Classify several images concurrently, one JSON line per image
    Batch(analyze::BatchArgs),

    /// Show which models are available
    Models,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Classify(args) => analyze::classify(&cli.models, args).await,
        Commands::Batch(args) => analyze::batch(&cli.models, args).await,
        Commands::Models => analyze::models(&cli.models).await,
    }
}
