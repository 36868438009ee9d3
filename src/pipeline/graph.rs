// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Pipeline orchestrator
//!
//! Assembles the static stage graph and wires artifact outputs of one
//! stage as inputs of the next. Construction is synchronous, deterministic
//! and side-effect-free: it declares calls to the external source host,
//! build environment and deployment engine, but performs no network or
//! process activity.

use serde::{Deserialize, Serialize};

use crate::errors::{ShipflowError, ShipflowResult};
use crate::pipeline::{Action, Artifact};
use crate::policy::{Grant, Identity};

/// A named grouping of actions, positionally ordered within its pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Stage {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }
}

/// An ordered sequence of stages plus the pipeline-level execution
/// identity. Stage order is fixed and total once declared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub identity: Identity,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Create an empty pipeline with a derived execution identity
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let identity = Identity::new(format!("{name}-pipeline"));
        Self {
            name,
            identity,
            stages: Vec::new(),
        }
    }

    /// Append a new stage at the next position
    pub fn add_stage(&mut self, name: &str) -> ShipflowResult<usize> {
        if self.stages.iter().any(|s| s.name == name) {
            return Err(ShipflowError::DuplicateStage {
                stage: name.to_string(),
            });
        }
        self.stages.push(Stage::new(name));
        Ok(self.stages.len() - 1)
    }

    /// Register an action under a stage.
    ///
    /// Every declared input artifact must already be produced by an action
    /// in a strictly earlier stage, and no output may shadow an existing
    /// producer. Validation happens before any mutation, so a failed add
    /// leaves the graph untouched.
    pub fn add_action(&mut self, stage: &str, action: Action) -> ShipflowResult<()> {
        let position = self
            .stages
            .iter()
            .position(|s| s.name == stage)
            .ok_or_else(|| ShipflowError::StageNotFound {
                stage: stage.to_string(),
            })?;

        for input in action.inputs() {
            if !self.produced_before(position, &input.name) {
                return Err(ShipflowError::unresolved(action.name(), &input.name));
            }
        }

        for output in action.outputs() {
            if self.producer_of(&output.name).is_some() {
                return Err(ShipflowError::DuplicateArtifact {
                    artifact: output.name.clone(),
                });
            }
        }

        self.stages[position].actions.push(action);
        Ok(())
    }

    /// Attach a permission grant to the pipeline identity (idempotent)
    pub fn attach_policy(&mut self, grant: Grant) {
        self.identity.attach(grant);
    }

    /// Stages in declared order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// All stage names, in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Find the action producing a named artifact
    pub fn producer_of(&self, artifact: &str) -> Option<&Action> {
        self.stages
            .iter()
            .flat_map(|s| s.actions.iter())
            .find(|a| a.outputs().iter().any(|o| o.name == artifact))
    }

    /// The stage position of an artifact's producer
    pub fn producer_stage(&self, artifact: &str) -> Option<usize> {
        self.stages.iter().position(|s| {
            s.actions
                .iter()
                .any(|a| a.outputs().iter().any(|o| o.name == artifact))
        })
    }

    /// All artifacts declared as outputs anywhere in the graph
    pub fn artifacts(&self) -> Vec<&Artifact> {
        self.stages
            .iter()
            .flat_map(|s| s.actions.iter())
            .flat_map(|a| a.outputs())
            .collect()
    }

    /// All actions, in stage order
    pub fn actions(&self) -> impl Iterator<Item = (&Stage, &Action)> {
        self.stages
            .iter()
            .flat_map(|s| s.actions.iter().map(move |a| (s, a)))
    }

    fn produced_before(&self, position: usize, artifact: &str) -> bool {
        self.stages[..position]
            .iter()
            .flat_map(|s| s.actions.iter())
            .any(|a| a.outputs().iter().any(|o| o.name == artifact))
    }
}
