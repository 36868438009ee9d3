// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Init command - scaffold a new delivery configuration

use colored::Colorize;
use miette::Result;
use std::path::Path;

/// Run the init command
pub fn run(name: Option<String>, verbose: bool) -> Result<()> {
    let pipeline_name = name.unwrap_or_else(|| {
        std::env::current_dir()
            .ok()
            .and_then(|p| p.file_name().map(|s| s.to_string_lossy().to_string()))
            .unwrap_or_else(|| "my-service".to_string())
    });

    println!("{}", "Initializing delivery configuration...".bold());
    println!();

    if Path::new(".shipflow.yaml").exists() {
        return Err(miette::miette!(
            ".shipflow.yaml already exists. Remove it first to start over."
        ));
    }

    let content = generate_template(&pipeline_name);

    std::fs::write(".shipflow.yaml", &content)
        .map_err(|e| miette::miette!("Failed to write .shipflow.yaml: {}", e))?;

    println!("  {} Created .shipflow.yaml", "✓".green());
    println!();
    println!("{}", "Configuration initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} with your repository and stack", ".shipflow.yaml".cyan());
    println!("  2. Run {} to check the pipeline", "shipflow validate".cyan());
    println!("  3. Run {} to emit engine documents", "shipflow synth".cyan());
    println!();

    if verbose {
        println!("{}", "Generated configuration:".dimmed());
        println!("{}", "─".repeat(50).dimmed());
        println!("{}", content.dimmed());
    }

    Ok(())
}

fn generate_template(name: &str) -> String {
    format!(
        r#"# shipflow delivery configuration
# One linear pipeline: Source -> Build -> Deploy

version: "1"
name: "{name}"

source:
  owner: my-org
  repository: {name}
  branch: main
  # Named secret holding the source-host credential. The pipeline
  # identity gets a secret-read grant scoped to this reference.
  credential: SourceHostToken

registry:
  endpoint: registry.example.com/{name}
  # Inject the endpoint into the build as $REGISTRY_URI instead of
  # spelling it inline in the commands below.
  env_var: REGISTRY_URI

build:
  image: "standard:7.0"
  # Required for nested container builds (image build/push). The build
  # identity then needs the registry grant, which shipflow attaches.
  privileged: true
  base_directory: out
  phases:
    install:
      - npm install
    pre_build:
      - registry-login "$REGISTRY_URI"
    build:
      - npm run build
      - npx synth-template
      - container-build-push "$REGISTRY_URI:latest"

deploy:
  stack: {name}-stack
  template: {name}-stack.template.json
  elevated: true
  # parameters:
  #   Environment: production
"#
    )
}
