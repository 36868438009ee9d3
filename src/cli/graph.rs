// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Graph command - visualize the artifact wiring

use miette::Result;
use std::path::PathBuf;

use super::GraphFormat;
use crate::config::DeliveryConfig;
use crate::pipeline::{assemble, ArtifactWiring};

/// Run the graph command
pub fn run(config_path: PathBuf, format: GraphFormat, _verbose: bool) -> Result<()> {
    let config = DeliveryConfig::from_file(&config_path)?;
    let pipeline = assemble(&config)?;
    let wiring = ArtifactWiring::build(&pipeline)?;

    let output = match format {
        GraphFormat::Text => wiring.to_text(&pipeline),
        GraphFormat::Dot => wiring.to_dot(),
        GraphFormat::Mermaid => wiring.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
