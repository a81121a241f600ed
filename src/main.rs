// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! shipflow - App Store Shipping Pipeline
//!
//! Resumable, self-healing release automation over Apple developer tooling.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shipflow::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Dispatch to command handlers
    match cli.command {
        Commands::Ship {
            target,
            resume_from,
            version,
            release_notes,
            dry_run,
            optimize,
        } => {
            shipflow::cli::ship::run(
                shipflow::cli::ship::ShipArgs {
                    target,
                    resume_from,
                    version,
                    release_notes,
                    dry_run,
                    optimize,
                },
                cli.verbose,
            )
            .await
        }
        Commands::Validate { target } => shipflow::cli::validate::run(target, cli.verbose).await,
        Commands::Metadata { action } => shipflow::cli::metadata::run(action, cli.verbose).await,
        Commands::Doctor => shipflow::cli::doctor::run(cli.verbose).await,
    }
}
