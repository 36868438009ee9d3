// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pipeline graph and orchestration
//!
//! This module defines the core data structures of the delivery graph:
//! stages, actions, artifacts, the orchestrator that wires them, and the
//! validator that decides whether the result is executable.

mod action;
mod assembler;
mod graph;
mod validation;
mod wiring;

pub use action::{Action, Artifact, ArtifactPath, BuildAction, DeployAction, SourceAction};
pub use assembler::{assemble, BUILD_ARTIFACT, SOURCE_ARTIFACT};
pub use graph::{Pipeline, Stage};
pub use validation::{PipelineValidator, ValidationResult, CANONICAL_STAGES};
pub use wiring::ArtifactWiring;
