// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pipeline actions and artifacts
//!
//! The three action variants of the delivery shape: source fetch, build,
//! and stack deploy. Artifacts are named, opaque bundles of files passed
//! between actions; identity is the name, content belongs to the external
//! execution engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::buildspec::BuildDefinition;
use crate::policy::Identity;

/// A named, opaque bundle of files passed between actions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Artifact {
    pub name: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Address a file inside this artifact
    pub fn at_path(&self, file: impl Into<String>) -> ArtifactPath {
        ArtifactPath {
            artifact: self.clone(),
            file: file.into(),
        }
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A file location inside a named artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactPath {
    pub artifact: Artifact,
    pub file: String,
}

/// Pulls a named branch of a named repository from the external source
/// host, producing exactly one output artifact. The credential is a
/// reference to a named secret, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceAction {
    pub name: String,
    pub owner: String,
    pub repository: String,
    pub branch: String,
    pub credential: String,
    pub output: Artifact,
}

impl SourceAction {
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
        credential: impl Into<String>,
        output: Artifact,
    ) -> Self {
        Self {
            name: name.into(),
            owner: owner.into(),
            repository: repository.into(),
            branch: branch.into(),
            credential: credential.into(),
            output,
        }
    }
}

/// Runs a build definition against one input artifact, producing one or
/// more output artifacts. Carries its own execution identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildAction {
    pub name: String,
    pub definition: BuildDefinition,
    pub identity: Identity,
    pub input: Artifact,
    pub outputs: Vec<Artifact>,
}

impl BuildAction {
    pub fn new(
        name: impl Into<String>,
        definition: BuildDefinition,
        identity: Identity,
        input: Artifact,
        outputs: Vec<Artifact>,
    ) -> Self {
        Self {
            name: name.into(),
            definition,
            identity,
            input,
            outputs,
        }
    }
}

/// Invokes the external deployment engine to create or update a named
/// stack from a template file inside an input artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployAction {
    pub name: String,
    pub stack: String,
    pub template: ArtifactPath,
    /// Permission-elevation flag passed through to the engine
    #[serde(default)]
    pub elevated: bool,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl DeployAction {
    pub fn new(
        name: impl Into<String>,
        stack: impl Into<String>,
        template: ArtifactPath,
        elevated: bool,
        parameters: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            stack: stack.into(),
            template,
            elevated,
            parameters,
        }
    }
}

/// A unit of work within a stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    Source(SourceAction),
    Build(BuildAction),
    Deploy(DeployAction),
}

impl Action {
    /// Action name within its stage
    pub fn name(&self) -> &str {
        match self {
            Self::Source(a) => &a.name,
            Self::Build(a) => &a.name,
            Self::Deploy(a) => &a.name,
        }
    }

    /// Kind label for display
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Source(_) => "source",
            Self::Build(_) => "build",
            Self::Deploy(_) => "deploy",
        }
    }

    /// Artifacts this action consumes
    pub fn inputs(&self) -> Vec<&Artifact> {
        match self {
            Self::Source(_) => vec![],
            Self::Build(a) => vec![&a.input],
            Self::Deploy(a) => vec![&a.template.artifact],
        }
    }

    /// Artifacts this action produces
    pub fn outputs(&self) -> Vec<&Artifact> {
        match self {
            Self::Source(a) => vec![&a.output],
            Self::Build(a) => a.outputs.iter().collect(),
            Self::Deploy(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_action_has_one_output_no_inputs() {
        let action = Action::Source(SourceAction::new(
            "source",
            "acme",
            "svc",
            "main",
            "GitHubAccessToken",
            Artifact::new("src"),
        ));

        assert!(action.inputs().is_empty());
        assert_eq!(action.outputs().len(), 1);
        assert_eq!(action.outputs()[0].name, "src");
    }

    #[test]
    fn test_deploy_action_consumes_template_artifact() {
        let action = Action::Deploy(DeployAction::new(
            "deploy",
            "SvcStack",
            Artifact::new("out").at_path("template.json"),
            true,
            BTreeMap::new(),
        ));

        assert_eq!(action.inputs()[0].name, "out");
        assert!(action.outputs().is_empty());
        assert_eq!(action.kind_name(), "deploy");
    }

    #[test]
    fn test_artifact_at_path() {
        let path = Artifact::new("BuildOutput").at_path("SvcStack.template.json");
        assert_eq!(path.artifact.name, "BuildOutput");
        assert_eq!(path.file, "SvcStack.template.json");
    }
}
