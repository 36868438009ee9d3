// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for shipflow.

pub mod graph;
pub mod init;
pub mod synth;
pub mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Delivery pipeline declarator
///
/// Declare, validate and render Source → Build → Deploy pipelines.
#[derive(Parser, Debug)]
#[clap(
    name = "shipflow",
    version,
    about = "Delivery pipeline declarator for containerized API deployments",
    long_about = None,
    after_help = "Examples:\n\
        shipflow init                   Scaffold a delivery configuration\n\
        shipflow validate               Check the pipeline is executable\n\
        shipflow graph --format dot     Render the artifact wiring\n\
        shipflow synth                  Emit engine-facing documents\n\n\
        See 'shipflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a new delivery configuration
    Init {
        /// Pipeline name (defaults to current directory name)
        name: Option<String>,
    },

    /// Validate the declared pipeline
    Validate {
        /// Configuration file to validate
        #[clap(default_value = ".shipflow.yaml")]
        config: PathBuf,
    },

    /// Show the artifact wiring as a graph
    Graph {
        /// Configuration file
        #[clap(default_value = ".shipflow.yaml")]
        config: PathBuf,

        /// Output format (text, dot, mermaid)
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },

    /// Emit the documents consumed by the external engines
    Synth {
        /// Configuration file
        #[clap(default_value = ".shipflow.yaml")]
        config: PathBuf,

        /// Output format (json, yaml)
        #[clap(short, long, default_value = "json")]
        format: OutputFormat,
    },
}

/// Output format for synth command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}
