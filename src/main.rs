// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! shipflow - Delivery Pipeline Declarator
//!
//! Declare, validate and render Source → Build → Deploy pipelines.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shipflow::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shipflow=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    // Dispatch to command handlers
    match cli.command {
        Commands::Init { name } => shipflow::cli::init::run(name, cli.verbose),
        Commands::Validate { config } => shipflow::cli::validate::run(config, cli.verbose),
        Commands::Graph { config, format } => {
            shipflow::cli::graph::run(config, format, cli.verbose)
        }
        Commands::Synth { config, format } => {
            shipflow::cli::synth::run(config, format, cli.verbose)
        }
    }
}
