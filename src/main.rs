// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use skin_analyzer::cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for JSON results
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    tracing::info!("{}", skin_analyzer::version::get_version_string());

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute the command
    match execute(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
