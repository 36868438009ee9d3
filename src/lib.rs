// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! # shipflow - Delivery Pipeline Declarator
//!
//! `shipflow` declares the topology of a continuous-delivery pipeline for
//! a containerized API application: an ordered Source → Build → Deploy
//! graph, the artifacts flowing between stages, and the least-privilege
//! grants each execution identity needs.
//!
//! Everything here is declarative. Building the graph performs no network
//! or process activity; running it belongs to an external execution
//! engine.
//!
//! ## Quick Start
//!
//! ```bash
//! # Scaffold a delivery configuration
//! shipflow init my-service
//!
//! # Check the declared pipeline is executable
//! shipflow validate
//!
//! # Render the artifact wiring
//! shipflow graph --format mermaid
//!
//! # Emit the documents consumed by the external engines
//! shipflow synth
//! ```

pub mod buildspec;
pub mod cli;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod policy;

// Re-export commonly used types
pub use config::DeliveryConfig;
pub use errors::{ShipflowError, ShipflowResult};
pub use pipeline::{assemble, Action, Artifact, Pipeline, PipelineValidator, Stage};
pub use policy::{Grant, Identity, PolicySet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
