// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pipeline validation
//!
//! Checks a declared pipeline before it is considered executable.
//! Definition-time failures are fatal; the validator never lets a
//! partially-wired or under-granted pipeline through.

use crate::errors::{ShipflowError, ShipflowResult};
use crate::pipeline::{Action, Pipeline};
use crate::policy::SECRET_READ_ACTION;

/// The fixed, total stage order of the delivery shape
pub const CANONICAL_STAGES: [&str; 3] = ["Source", "Build", "Deploy"];

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline, collecting every error and warning
    pub fn validate(pipeline: &Pipeline) -> ValidationResult {
        let mut result = ValidationResult::new();

        for error in Self::definition_errors(pipeline) {
            result.add_error(&error.to_string());
        }

        for stage in pipeline.stages() {
            for action in &stage.actions {
                if let Action::Deploy(deploy) = action {
                    if !deploy.elevated {
                        result.add_warning(&format!(
                            "Deploy action '{}' runs without permission elevation; \
                             the engine identity must cover stack operations on '{}'",
                            deploy.name, deploy.stack
                        ));
                    }
                }
            }
        }

        result
    }

    /// Fail with the first definition-time error, if any
    pub fn ensure_executable(pipeline: &Pipeline) -> ShipflowResult<()> {
        match Self::definition_errors(pipeline).into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn definition_errors(pipeline: &Pipeline) -> Vec<ShipflowError> {
        let mut errors = Vec::new();

        if pipeline.stages().is_empty() {
            errors.push(ShipflowError::EmptyPipeline);
            return errors;
        }

        // The delivery shape is total: no stage may be skipped or
        // reordered.
        let names = pipeline.stage_names();
        if names != CANONICAL_STAGES {
            errors.push(ShipflowError::StageOrder {
                found: names.join(", "),
            });
        }

        for (position, stage) in pipeline.stages().iter().enumerate() {
            if stage.actions.is_empty() {
                errors.push(ShipflowError::InvalidStage {
                    stage: stage.name.clone(),
                    reason: "stage declares no actions".into(),
                });
            }

            for action in &stage.actions {
                Self::check_action(pipeline, position, action, &mut errors);
            }
        }

        errors
    }

    fn check_action(
        pipeline: &Pipeline,
        position: usize,
        action: &Action,
        errors: &mut Vec<ShipflowError>,
    ) {
        // Every non-source action consumes at least one artifact produced
        // strictly earlier.
        if !matches!(action, Action::Source(_)) && action.inputs().is_empty() {
            errors.push(ShipflowError::InvalidStage {
                stage: pipeline.stages()[position].name.clone(),
                reason: format!("action '{}' declares no input artifact", action.name()),
            });
        }

        for input in action.inputs() {
            match pipeline.producer_stage(&input.name) {
                Some(producer) if producer < position => {}
                _ => errors.push(ShipflowError::unresolved(action.name(), &input.name)),
            }
        }

        match action {
            Action::Source(source) => {
                // The source credential must be covered by the pipeline
                // identity's secret-read grant, or the pipeline is not
                // executable.
                if !pipeline
                    .identity
                    .policies
                    .allows(SECRET_READ_ACTION, &source.credential)
                {
                    errors.push(ShipflowError::missing_grant(
                        &pipeline.identity.name,
                        SECRET_READ_ACTION,
                        &source.credential,
                    ));
                }
            }
            Action::Build(build) => {
                if let Err(error) = build.definition.validate() {
                    errors.push(error);
                }
                if build.outputs.is_empty() {
                    errors.push(ShipflowError::InvalidStage {
                        stage: pipeline.stages()[position].name.clone(),
                        reason: format!("build action '{}' declares no outputs", build.name),
                    });
                }
                // A privileged definition performs nested container
                // builds, so its identity must hold the registry grant
                // before the pipeline is considered valid. Enforcement at
                // run time belongs to the external authorization layer.
                if build.definition.environment.privileged {
                    for registry_action in crate::policy::REGISTRY_ACTIONS {
                        if !build.identity.policies.allows_action(registry_action) {
                            errors.push(ShipflowError::missing_grant(
                                &build.identity.name,
                                registry_action,
                                "*",
                            ));
                            break;
                        }
                    }
                }
            }
            Action::Deploy(_) => {}
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildspec::{ArtifactRule, BuildDefinition, BuildEnvironment, Phases};
    use crate::pipeline::{Artifact, BuildAction, DeployAction, SourceAction};
    use crate::policy::{Grant, Identity};
    use std::collections::BTreeMap;

    fn definition(privileged: bool) -> BuildDefinition {
        let environment = if privileged {
            BuildEnvironment::new("standard:7.0").privileged()
        } else {
            BuildEnvironment::new("standard:7.0")
        };
        BuildDefinition::new(
            environment,
            Phases {
                build: vec!["make".into()],
                ..Phases::default()
            },
            ArtifactRule::new("out", ["template.json"]),
        )
    }

    fn delivery_pipeline(secret: &str, privileged: bool, registry_granted: bool) -> Pipeline {
        let mut pipeline = Pipeline::new("api-delivery");
        pipeline.attach_policy(Grant::secret_read(secret));

        pipeline.add_stage("Source").unwrap();
        pipeline
            .add_action(
                "Source",
                Action::Source(SourceAction::new(
                    "source",
                    "acme",
                    "svc",
                    "main",
                    "X",
                    Artifact::new("src"),
                )),
            )
            .unwrap();

        let mut build_identity = Identity::new("api-delivery-build");
        if registry_granted {
            build_identity.attach(Grant::registry(["*"]));
        }
        pipeline.add_stage("Build").unwrap();
        pipeline
            .add_action(
                "Build",
                Action::Build(BuildAction::new(
                    "build",
                    definition(privileged),
                    build_identity,
                    Artifact::new("src"),
                    vec![Artifact::new("out")],
                )),
            )
            .unwrap();

        pipeline.add_stage("Deploy").unwrap();
        pipeline
            .add_action(
                "Deploy",
                Action::Deploy(DeployAction::new(
                    "deploy",
                    "SvcStack",
                    Artifact::new("out").at_path("template.json"),
                    true,
                    BTreeMap::new(),
                )),
            )
            .unwrap();

        pipeline
    }

    #[test]
    fn test_covered_credential_validates() {
        let pipeline = delivery_pipeline("X", true, true);
        assert!(PipelineValidator::ensure_executable(&pipeline).is_ok());
        assert!(PipelineValidator::validate(&pipeline).is_valid());
    }

    #[test]
    fn test_wrong_secret_scope_fails_coverage() {
        // Grant scoped to secret "Y" while the source references "X".
        let pipeline = delivery_pipeline("Y", false, false);

        let err = PipelineValidator::ensure_executable(&pipeline).unwrap_err();
        match err {
            ShipflowError::MissingGrant { action, resource, .. } => {
                assert_eq!(action, SECRET_READ_ACTION);
                assert_eq!(resource, "X");
            }
            other => panic!("expected MissingGrant, got {other}"),
        }
    }

    #[test]
    fn test_privileged_build_requires_registry_grant() {
        let pipeline = delivery_pipeline("X", true, false);

        let err = PipelineValidator::ensure_executable(&pipeline).unwrap_err();
        assert!(matches!(err, ShipflowError::MissingGrant { .. }));

        // Unprivileged builds carry no registry obligation.
        let pipeline = delivery_pipeline("X", false, false);
        assert!(PipelineValidator::ensure_executable(&pipeline).is_ok());
    }

    #[test]
    fn test_stage_order_is_enforced() {
        let mut pipeline = Pipeline::new("api-delivery");
        pipeline.attach_policy(Grant::secret_read("X"));
        pipeline.add_stage("Build").unwrap();
        pipeline.add_stage("Source").unwrap();
        pipeline
            .add_action(
                "Source",
                Action::Source(SourceAction::new(
                    "source",
                    "acme",
                    "svc",
                    "main",
                    "X",
                    Artifact::new("src"),
                )),
            )
            .unwrap();

        let result = PipelineValidator::validate(&pipeline);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Source, Build, Deploy")));
    }

    #[test]
    fn test_empty_pipeline_is_invalid() {
        let pipeline = Pipeline::new("api-delivery");
        let err = PipelineValidator::ensure_executable(&pipeline).unwrap_err();
        assert!(matches!(err, ShipflowError::EmptyPipeline));
    }

    #[test]
    fn test_unelevated_deploy_warns() {
        let mut pipeline = delivery_pipeline("X", false, false);
        // Rebuild the deploy action without elevation.
        let stage_names = pipeline.stage_names();
        assert_eq!(stage_names, CANONICAL_STAGES);
        let mut result = PipelineValidator::validate(&pipeline);
        assert!(!result.has_warnings());

        pipeline = {
            let mut p = Pipeline::new("api-delivery");
            p.attach_policy(Grant::secret_read("X"));
            p.add_stage("Source").unwrap();
            p.add_action(
                "Source",
                Action::Source(SourceAction::new(
                    "source",
                    "acme",
                    "svc",
                    "main",
                    "X",
                    Artifact::new("src"),
                )),
            )
            .unwrap();
            p.add_stage("Build").unwrap();
            p.add_action(
                "Build",
                Action::Build(BuildAction::new(
                    "build",
                    definition(false),
                    Identity::new("api-delivery-build"),
                    Artifact::new("src"),
                    vec![Artifact::new("out")],
                )),
            )
            .unwrap();
            p.add_stage("Deploy").unwrap();
            p.add_action(
                "Deploy",
                Action::Deploy(DeployAction::new(
                    "deploy",
                    "SvcStack",
                    Artifact::new("out").at_path("template.json"),
                    false,
                    BTreeMap::new(),
                )),
            )
            .unwrap();
            p
        };

        result = PipelineValidator::validate(&pipeline);
        assert!(result.is_valid());
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("permission elevation"));
    }
}
