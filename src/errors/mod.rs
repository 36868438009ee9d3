// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Error types for pipeline declaration
//!
//! Definition-time errors are fatal: shipflow refuses to produce an
//! executable pipeline rather than a partially-wired one. Execution-time
//! errors are reported by the external engine; the variants here only
//! model their shape.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for shipflow operations
pub type ShipflowResult<T> = Result<T, ShipflowError>;

/// Main error type for shipflow
#[derive(Error, Debug, Diagnostic)]
pub enum ShipflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Definition Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Stage '{stage}' already exists in this pipeline")]
    #[diagnostic(
        code(shipflow::duplicate_stage),
        help("Stage names must be unique; the delivery shape is Source, Build, Deploy")
    )]
    DuplicateStage { stage: String },

    #[error("Stage '{stage}' not found in pipeline")]
    #[diagnostic(code(shipflow::stage_not_found))]
    StageNotFound { stage: String },

    #[error("Action '{action}' consumes artifact '{artifact}' which no earlier stage produces")]
    #[diagnostic(
        code(shipflow::unresolved_artifact),
        help("Every input artifact must be the output of an action in a strictly earlier stage")
    )]
    UnresolvedArtifact { action: String, artifact: String },

    #[error("Artifact '{artifact}' is produced by more than one action")]
    #[diagnostic(
        code(shipflow::duplicate_artifact),
        help("Artifact identity is its name; each artifact has exactly one producer")
    )]
    DuplicateArtifact { artifact: String },

    #[error("Identity '{identity}' lacks a grant for '{action}' on '{resource}'")]
    #[diagnostic(
        code(shipflow::missing_grant),
        help("Attach the required grant before the pipeline becomes executable")
    )]
    MissingGrant {
        identity: String,
        action: String,
        resource: String,
    },

    #[error("Pipeline has no stages defined")]
    #[diagnostic(code(shipflow::empty_pipeline))]
    EmptyPipeline,

    #[error("Stage order must be Source, Build, Deploy; found [{found}]")]
    #[diagnostic(code(shipflow::stage_order))]
    StageOrder { found: String },

    #[error("Stage '{stage}' is invalid: {reason}")]
    #[diagnostic(code(shipflow::invalid_stage))]
    InvalidStage { stage: String, reason: String },

    #[error("Build definition is invalid: {reason}")]
    #[diagnostic(code(shipflow::invalid_build_definition))]
    InvalidBuildDefinition { reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Execution Shapes (reported by the external engine, modeled here)
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Build phase '{phase}' failed with exit code {exit_code}")]
    #[diagnostic(code(shipflow::phase_failure))]
    PhaseFailure { phase: String, exit_code: i32 },

    #[error("Artifact export rule matched no files under '{base_directory}': {pattern}")]
    #[diagnostic(code(shipflow::artifact_export_mismatch))]
    ArtifactExportMismatch {
        base_directory: PathBuf,
        pattern: String,
    },

    #[error("Source fetch failed for '{repository}' on branch '{branch}': {reason}")]
    #[diagnostic(code(shipflow::source_fetch_failed))]
    SourceFetchFailed {
        repository: String,
        branch: String,
        reason: String,
    },

    #[error("Deployment of stack '{stack}' failed: {reason}")]
    #[diagnostic(code(shipflow::deploy_failed))]
    DeployFailed { stack: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(shipflow::config_not_found),
        help("Create a delivery configuration with 'shipflow init' or write .shipflow.yaml manually")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(shipflow::invalid_config))]
    InvalidConfig {
        reason: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(shipflow::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("Failed to write file '{path}': {error}")]
    #[diagnostic(code(shipflow::file_write_error))]
    FileWriteError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(shipflow::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(shipflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(shipflow::json_error))]
    Json { message: String },

    #[error("Glob pattern error: {message}")]
    #[diagnostic(code(shipflow::glob_error))]
    GlobPattern { message: String },
}

impl From<std::io::Error> for ShipflowError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for ShipflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for ShipflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<glob::PatternError> for ShipflowError {
    fn from(e: glob::PatternError) -> Self {
        Self::GlobPattern { message: e.to_string() }
    }
}

impl ShipflowError {
    /// Create an unresolved-artifact error for an action input
    pub fn unresolved(action: &str, artifact: &str) -> Self {
        Self::UnresolvedArtifact {
            action: action.to_string(),
            artifact: artifact.to_string(),
        }
    }

    /// Create a missing-grant coverage error
    pub fn missing_grant(identity: &str, action: &str, resource: &str) -> Self {
        Self::MissingGrant {
            identity: identity.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
        }
    }

    /// True for errors that must block graph construction entirely
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateStage { .. }
                | Self::StageNotFound { .. }
                | Self::UnresolvedArtifact { .. }
                | Self::DuplicateArtifact { .. }
                | Self::MissingGrant { .. }
                | Self::EmptyPipeline
                | Self::StageOrder { .. }
                | Self::InvalidStage { .. }
                | Self::InvalidBuildDefinition { .. }
        )
    }
}
