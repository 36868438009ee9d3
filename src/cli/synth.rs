// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Synth command - emit the documents consumed by the external engines
//!
//! Produces the pipeline description, the rendered build definition and
//! the policy document for each execution identity. Nothing is sent
//! anywhere; the external engines consume these documents later.

use miette::Result;
use std::path::PathBuf;

use super::OutputFormat;
use crate::config::DeliveryConfig;
use crate::pipeline::{assemble, Action, Pipeline};

/// Run the synth command
pub fn run(config_path: PathBuf, format: OutputFormat, _verbose: bool) -> Result<()> {
    let config = DeliveryConfig::from_file(&config_path)?;
    let pipeline = assemble(&config)?;

    let document = synthesize(&pipeline);

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&document)
            .map_err(crate::errors::ShipflowError::from)?,
        OutputFormat::Yaml => serde_yaml::to_string(&document)
            .map_err(crate::errors::ShipflowError::from)?,
    };

    println!("{}", rendered);

    Ok(())
}

/// Build the combined synth document for a pipeline
pub fn synthesize(pipeline: &Pipeline) -> serde_json::Value {
    let mut identities = serde_json::Map::new();
    identities.insert(
        pipeline.identity.name.clone(),
        pipeline.identity.policies.to_document(),
    );

    let mut build_specs = serde_json::Map::new();
    for (_, action) in pipeline.actions() {
        if let Action::Build(build) = action {
            identities.insert(
                build.identity.name.clone(),
                build.identity.policies.to_document(),
            );
            build_specs.insert(build.name.clone(), build.definition.render());
        }
    }

    serde_json::json!({
        "pipeline": pipeline,
        "buildSpecs": build_specs,
        "identities": identities,
    })
}
