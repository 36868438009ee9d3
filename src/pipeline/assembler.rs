// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Delivery pipeline assembler
//!
//! Builds the canonical three-stage delivery graph from a configuration:
//! a source fetch feeding a containerized build feeding a stack deploy,
//! with the secret-read grant on the pipeline identity and the registry
//! grant on the build identity. Given identical configuration, the
//! assembled graph is structurally identical.

use crate::buildspec::{ArtifactRule, BuildDefinition, BuildEnvironment, EnvValue, Phases};
use crate::config::DeliveryConfig;
use crate::errors::ShipflowResult;
use crate::pipeline::{
    Action, Artifact, BuildAction, DeployAction, Pipeline, PipelineValidator, SourceAction,
};
use crate::policy::{Grant, Identity};

/// Output artifact of the source stage
pub const SOURCE_ARTIFACT: &str = "SourceOutput";

/// Output artifact of the build stage
pub const BUILD_ARTIFACT: &str = "BuildOutput";

/// Assemble an executable delivery pipeline from configuration.
///
/// Ends with a full executability check, so the returned pipeline is
/// never partially wired or under-granted.
pub fn assemble(config: &DeliveryConfig) -> ShipflowResult<Pipeline> {
    let mut pipeline = Pipeline::new(&config.name);
    pipeline.attach_policy(Grant::secret_read(config.source.grant_resource()));

    let mut build_identity = Identity::new(format!("{}-build", config.name));
    build_identity.attach(Grant::registry(config.registry.resources.iter().cloned()));

    let definition = build_definition(config);
    definition.validate()?;

    let source_output = Artifact::new(SOURCE_ARTIFACT);
    let build_output = Artifact::new(BUILD_ARTIFACT);

    pipeline.add_stage("Source")?;
    pipeline.add_action(
        "Source",
        Action::Source(SourceAction::new(
            "source",
            &config.source.owner,
            &config.source.repository,
            &config.source.branch,
            &config.source.credential,
            source_output.clone(),
        )),
    )?;

    pipeline.add_stage("Build")?;
    pipeline.add_action(
        "Build",
        Action::Build(BuildAction::new(
            "build",
            definition,
            build_identity,
            source_output,
            vec![build_output.clone()],
        )),
    )?;

    pipeline.add_stage("Deploy")?;
    pipeline.add_action(
        "Deploy",
        Action::Deploy(DeployAction::new(
            "deploy",
            &config.deploy.stack,
            build_output.at_path(&config.deploy.template),
            config.deploy.elevated,
            config.deploy.parameters.clone(),
        )),
    )?;

    PipelineValidator::ensure_executable(&pipeline)?;

    tracing::debug!(
        pipeline = %pipeline.name,
        stages = pipeline.stages().len(),
        "assembled delivery pipeline"
    );

    Ok(pipeline)
}

fn build_definition(config: &DeliveryConfig) -> BuildDefinition {
    let mut environment = BuildEnvironment::new(&config.build.image);
    if config.build.privileged {
        environment.privileged = true;
    }
    for (name, value) in &config.build.env {
        environment.env.insert(name.clone(), value.clone());
    }

    // The registry endpoint may flow into the script as an environment
    // variable instead of being spelled inline in the command payload.
    if let Some(var) = &config.registry.env_var {
        environment.env.insert(
            var.clone(),
            EnvValue::Plaintext(config.registry.endpoint.clone()),
        );
    }

    BuildDefinition::new(
        environment,
        Phases {
            install: config.build.phases.install.clone(),
            pre_build: config.build.phases.pre_build.clone(),
            build: config.build.phases.build.clone(),
        },
        ArtifactRule::new(
            config.build.base_directory.clone(),
            [config.deploy.template.clone()],
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ArtifactWiring;
    use crate::policy::SECRET_READ_ACTION;

    fn sample_config() -> DeliveryConfig {
        DeliveryConfig::from_yaml(
            r#"
name: api-delivery
source:
  owner: acme
  repository: svc
  branch: main
  credential: GitHubAccessToken
registry:
  endpoint: registry.example.com/app-images
  env_var: REGISTRY_URI
build:
  image: "standard:7.0"
  privileged: true
  base_directory: out
  phases:
    install:
      - npm install
    pre_build:
      - registry-login
    build:
      - npm run build
      - synth-template
deploy:
  stack: SvcStack
  template: SvcStack.template.json
  elevated: true
  parameters:
    Environment: production
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_assembled_stage_order() {
        let pipeline = assemble(&sample_config()).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["Source", "Build", "Deploy"]);
    }

    #[test]
    fn test_deploy_input_resolves_to_build_output() {
        let pipeline = assemble(&sample_config()).unwrap();

        let deploy = &pipeline.stage("Deploy").unwrap().actions[0];
        let input = &deploy.inputs()[0].name;
        let producer = pipeline.producer_of(input).unwrap();
        assert_eq!(producer.name(), "build");
        assert_eq!(*input, BUILD_ARTIFACT);
    }

    #[test]
    fn test_grants_are_attached() {
        let pipeline = assemble(&sample_config()).unwrap();

        assert!(pipeline
            .identity
            .policies
            .allows(SECRET_READ_ACTION, "GitHubAccessToken"));

        let Action::Build(build) = &pipeline.stage("Build").unwrap().actions[0] else {
            panic!("expected build action");
        };
        assert!(build.identity.policies.allows_action("registry:PutImage"));
    }

    #[test]
    fn test_registry_endpoint_injected_as_env_var() {
        let pipeline = assemble(&sample_config()).unwrap();

        let Action::Build(build) = &pipeline.stage("Build").unwrap().actions[0] else {
            panic!("expected build action");
        };
        assert_eq!(
            build.definition.environment.env["REGISTRY_URI"],
            EnvValue::Plaintext("registry.example.com/app-images".into())
        );
    }

    #[test]
    fn test_export_rule_targets_template() {
        let pipeline = assemble(&sample_config()).unwrap();

        let Action::Build(build) = &pipeline.stage("Build").unwrap().actions[0] else {
            panic!("expected build action");
        };
        assert_eq!(
            build.definition.artifacts.files,
            vec!["SvcStack.template.json".to_string()]
        );
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let config = sample_config();
        let first = assemble(&config).unwrap();
        let second = assemble(&config).unwrap();
        assert_eq!(first, second);

        // Identical wiring too, not just structural equality.
        let first_dot = ArtifactWiring::build(&first).unwrap().to_dot();
        let second_dot = ArtifactWiring::build(&second).unwrap().to_dot();
        assert_eq!(first_dot, second_dot);
    }

    #[test]
    fn test_empty_build_phase_blocks_assembly() {
        let mut config = sample_config();
        config.build.phases.build.clear();

        assert!(assemble(&config).is_err());
    }
}
