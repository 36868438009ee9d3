// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Delivery configuration
//!
//! Defines the schema for .shipflow.yaml files. Everything the original
//! graph hardcoded (repository coordinates, secret references, registry
//! endpoint, stack name, template filename) is configuration input here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::buildspec::EnvValue;
use crate::errors::{ShipflowError, ShipflowResult};

/// Delivery configuration from .shipflow.yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Configuration version (for future compatibility)
    #[serde(default = "default_version")]
    pub version: String,

    /// Pipeline name
    pub name: String,

    /// Pipeline description
    #[serde(default)]
    pub description: Option<String>,

    pub source: SourceConfig,

    pub registry: RegistryConfig,

    pub build: BuildConfig,

    pub deploy: DeployConfig,
}

fn default_version() -> String {
    "1".to_string()
}

impl DeliveryConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &std::path::Path) -> ShipflowResult<Self> {
        if !path.exists() {
            return Err(ShipflowError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ShipflowError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> ShipflowResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> ShipflowResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }
}

/// Source repository coordinates and credential reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repository: String,

    /// Branch to pull
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Named secret holding the source-host credential
    pub credential: String,

    /// Resource identifier for the secret-read grant; defaults to the
    /// credential reference itself. May carry a trailing-* wildcard.
    #[serde(default)]
    pub credential_resource: Option<String>,
}

fn default_branch() -> String {
    "main".to_string()
}

impl SourceConfig {
    /// The resource the secret-read grant is scoped to
    pub fn grant_resource(&self) -> &str {
        self.credential_resource.as_deref().unwrap_or(&self.credential)
    }
}

/// Container registry endpoint and grant scoping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Registry endpoint the build pushes to
    pub endpoint: String,

    /// Resource identifiers for the registry grant; empty means wildcard
    #[serde(default)]
    pub resources: Vec<String>,

    /// When set, the endpoint is injected into the build environment
    /// under this variable name instead of being spelled inline in the
    /// script payload.
    #[serde(default)]
    pub env_var: Option<String>,
}

/// Build environment and script payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
    /// Build image selector
    pub image: String,

    /// Capability flag for nested containerized builds
    #[serde(default)]
    pub privileged: bool,

    /// Base directory the artifact-export rule reads from
    pub base_directory: PathBuf,

    /// Environment variable injections (plaintext or secret-backed)
    #[serde(default)]
    pub env: BTreeMap<String, EnvValue>,

    /// Ordered script phases; command strings are opaque payload
    #[serde(default)]
    pub phases: PhasesConfig,
}

/// Phase command lists
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PhasesConfig {
    #[serde(default)]
    pub install: Vec<String>,

    #[serde(default)]
    pub pre_build: Vec<String>,

    #[serde(default)]
    pub build: Vec<String>,
}

/// Deployment target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployConfig {
    /// Target stack name
    pub stack: String,

    /// Template filename inside the build output artifact
    pub template: String,

    /// Permission-elevation flag for the deployment engine
    #[serde(default)]
    pub elevated: bool,

    /// Parameter overrides passed to the stack
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}
