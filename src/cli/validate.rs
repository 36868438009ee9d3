// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Validate command - check the declared pipeline is executable

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::config::DeliveryConfig;
use crate::pipeline::{assemble, PipelineValidator};

/// Run the validate command
pub fn run(config_path: PathBuf, verbose: bool) -> Result<()> {
    println!("{}", "Validating delivery pipeline...".bold());
    println!();

    let config = match DeliveryConfig::from_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("  {} Failed to load configuration", "✗".red());
            eprintln!();
            return Err(e.into());
        }
    };

    println!("  {} Configuration file is valid YAML", "✓".green());

    // Assembly itself refuses duplicate stages, unresolved artifacts and
    // missing grants, so a failure here is a definition-time error.
    let pipeline = match assemble(&config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("  {} Pipeline is not executable", "✗".red());
            eprintln!();
            return Err(e.into());
        }
    };

    println!("  {} Pipeline graph is fully wired", "✓".green());

    let validation = PipelineValidator::validate(&pipeline);

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            println!("  {} {}", "⚠".yellow(), warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Pipeline summary".bold());
        println!("  Name: {}", pipeline.name);
        println!("  Identity: {}", pipeline.identity.name);
        println!("  Stages: {}", pipeline.stages().len());
        for stage in pipeline.stages() {
            println!("    - {}", stage.name);
            for action in &stage.actions {
                let io: Vec<String> = action
                    .inputs()
                    .iter()
                    .map(|a| format!("consumes {a}"))
                    .chain(action.outputs().iter().map(|a| format!("produces {a}")))
                    .collect();
                println!(
                    "        {} ({}){}",
                    action.name(),
                    action.kind_name(),
                    if io.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", io.join(", "))
                    }
                    .dimmed()
                );
            }
        }
    }

    println!();
    println!("{}", "Pipeline is executable!".green().bold());
    Ok(())
}
