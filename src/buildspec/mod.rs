// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Build definitions
//!
//! A build definition describes one ephemeral execution of a script
//! against a source artifact: environment selector, ordered script phases,
//! and an artifact-export rule. It is independent of the pipeline that
//! invokes it; definitions are plain values, so each invocation owns its
//! copy and shares no mutable state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::errors::{ShipflowError, ShipflowResult};

/// An environment variable injected into the build, either plaintext or
/// resolved from a named secret at run time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EnvValue {
    /// Literal value
    Plaintext(String),

    /// Resolved indirectly via a named secret, never embedded as plaintext
    Secret {
        /// Secret reference to resolve at run time
        secret: String,
    },
}

impl EnvValue {
    /// True when the value is secret-backed
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret { .. })
    }
}

/// Execution-environment selector for a build
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildEnvironment {
    /// Image identity the build runs in
    pub image: String,

    /// Capability flag for nested containerized builds (image build/push).
    /// shipflow records the flag; the sandbox is enforced by the external
    /// environment.
    #[serde(default)]
    pub privileged: bool,

    /// Environment variable injections
    #[serde(default)]
    pub env: BTreeMap<String, EnvValue>,
}

impl BuildEnvironment {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            privileged: false,
            env: BTreeMap::new(),
        }
    }

    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    pub fn with_env(mut self, name: impl Into<String>, value: EnvValue) -> Self {
        self.env.insert(name.into(), value);
        self
    }
}

/// Script phases, executed strictly in declared order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Install,
    PreBuild,
    Build,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Install => write!(f, "install"),
            Self::PreBuild => write!(f, "pre_build"),
            Self::Build => write!(f, "build"),
        }
    }
}

/// Ordered command lists for each phase. Commands are opaque payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Phases {
    #[serde(default)]
    pub install: Vec<String>,

    #[serde(default)]
    pub pre_build: Vec<String>,

    #[serde(default)]
    pub build: Vec<String>,
}

impl Phases {
    fn commands_for(&self, kind: PhaseKind) -> &[String] {
        match kind {
            PhaseKind::Install => &self.install,
            PhaseKind::PreBuild => &self.pre_build,
            PhaseKind::Build => &self.build,
        }
    }
}

/// Artifact-export rule: base directory plus file globs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRule {
    pub base_directory: PathBuf,
    pub files: Vec<String>,
}

impl ArtifactRule {
    pub fn new<F>(base_directory: impl Into<PathBuf>, files: F) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            base_directory: base_directory.into(),
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Check that every declared glob compiles
    pub fn validate(&self) -> ShipflowResult<()> {
        if self.files.is_empty() {
            return Err(ShipflowError::InvalidBuildDefinition {
                reason: "artifact export rule declares no file globs".into(),
            });
        }
        for pattern in &self.files {
            glob::Pattern::new(pattern)?;
        }
        Ok(())
    }
}

/// Declarative description of one isolated build execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildDefinition {
    pub environment: BuildEnvironment,
    pub phases: Phases,
    pub artifacts: ArtifactRule,
}

impl BuildDefinition {
    pub fn new(environment: BuildEnvironment, phases: Phases, artifacts: ArtifactRule) -> Self {
        Self {
            environment,
            phases,
            artifacts,
        }
    }

    /// Phases in their fixed execution order: install, pre_build, build
    pub fn ordered_phases(&self) -> [(PhaseKind, &[String]); 3] {
        [
            (PhaseKind::Install, self.phases.commands_for(PhaseKind::Install)),
            (PhaseKind::PreBuild, self.phases.commands_for(PhaseKind::PreBuild)),
            (PhaseKind::Build, self.phases.commands_for(PhaseKind::Build)),
        ]
    }

    /// Validate the definition at declaration time
    pub fn validate(&self) -> ShipflowResult<()> {
        if self.environment.image.is_empty() {
            return Err(ShipflowError::InvalidBuildDefinition {
                reason: "environment image selector is empty".into(),
            });
        }
        if self.phases.build.is_empty() {
            return Err(ShipflowError::InvalidBuildDefinition {
                reason: "build phase has no commands".into(),
            });
        }
        self.artifacts.validate()
    }

    /// Render the document consumed by the external build environment
    pub fn render(&self) -> serde_json::Value {
        let mut phases = serde_json::Map::new();
        for (kind, commands) in self.ordered_phases() {
            if !commands.is_empty() {
                phases.insert(
                    kind.to_string(),
                    serde_json::json!({ "commands": commands }),
                );
            }
        }

        let env: BTreeMap<&String, serde_json::Value> = self
            .environment
            .env
            .iter()
            .map(|(name, value)| {
                let rendered = match value {
                    EnvValue::Plaintext(v) => serde_json::json!({
                        "type": "plaintext",
                        "value": v,
                    }),
                    EnvValue::Secret { secret } => serde_json::json!({
                        "type": "secret",
                        "value": secret,
                    }),
                };
                (name, rendered)
            })
            .collect();

        serde_json::json!({
            "version": "1",
            "environment": {
                "image": self.environment.image,
                "privileged": self.environment.privileged,
            },
            "env": env,
            "phases": phases,
            "artifacts": {
                "base-directory": self.artifacts.base_directory,
                "files": self.artifacts.files,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_definition() -> BuildDefinition {
        BuildDefinition::new(
            BuildEnvironment::new("standard:7.0")
                .privileged()
                .with_env("REGISTRY_URI", EnvValue::Plaintext("registry.example.com/app".into()))
                .with_env("PUSH_TOKEN", EnvValue::Secret { secret: "RegistryPushToken".into() }),
            Phases {
                install: vec!["npm install".into()],
                pre_build: vec!["registry-login".into()],
                build: vec!["npm run build".into(), "image-build-push".into()],
            },
            ArtifactRule::new("out", ["SvcStack.template.json"]),
        )
    }

    #[test]
    fn test_phase_order_is_fixed() {
        let definition = sample_definition();
        let kinds: Vec<PhaseKind> = definition.ordered_phases().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![PhaseKind::Install, PhaseKind::PreBuild, PhaseKind::Build]);
    }

    #[test]
    fn test_validate_rejects_empty_build_phase() {
        let mut definition = sample_definition();
        definition.phases.build.clear();

        let err = definition.validate().unwrap_err();
        assert!(matches!(err, ShipflowError::InvalidBuildDefinition { .. }));
    }

    #[test]
    fn test_validate_rejects_bad_glob() {
        let mut definition = sample_definition();
        definition.artifacts.files = vec!["[".into()];

        let err = definition.validate().unwrap_err();
        assert!(matches!(err, ShipflowError::GlobPattern { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_export_rule() {
        let mut definition = sample_definition();
        definition.artifacts.files.clear();

        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_render_document_shape() {
        let doc = sample_definition().render();

        assert_eq!(doc["environment"]["privileged"], true);
        assert_eq!(doc["artifacts"]["base-directory"], "out");
        assert_eq!(doc["phases"]["install"]["commands"][0], "npm install");
        assert_eq!(doc["env"]["PUSH_TOKEN"]["type"], "secret");
        assert_eq!(doc["env"]["REGISTRY_URI"]["type"], "plaintext");
    }

    #[test]
    fn test_env_value_yaml_forms() {
        let plain: EnvValue = serde_yaml::from_str("registry.example.com/app").unwrap();
        assert!(!plain.is_secret());

        let secret: EnvValue = serde_yaml::from_str("secret: RegistryPushToken").unwrap();
        assert!(secret.is_secret());
    }

    #[test]
    fn test_reused_definition_invocations_are_independent() {
        let definition = sample_definition();
        let mut copy = definition.clone();
        copy.phases.build.push("extra".into());

        // The original is untouched by mutations of the copy.
        assert_eq!(definition.phases.build.len(), 2);
        assert_eq!(copy.phases.build.len(), 3);
    }
}
