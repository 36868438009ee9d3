// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Artifact wiring graph
//!
//! Builds the producer → consumer graph over a pipeline's actions, with
//! artifact names as edge labels. Used for rendering and for answering
//! which actions within a stage may run concurrently (those that share no
//! artifact path).

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

use crate::errors::{ShipflowError, ShipflowResult};
use crate::pipeline::Pipeline;

/// Artifact flow between a pipeline's actions
pub struct ArtifactWiring {
    graph: DiGraph<String, String>,
    name_to_index: HashMap<String, NodeIndex>,
    stage_of: HashMap<String, String>,
}

impl ArtifactWiring {
    /// Build the wiring graph from a pipeline
    pub fn build(pipeline: &Pipeline) -> ShipflowResult<Self> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();
        let mut stage_of = HashMap::new();
        let mut producer_of: HashMap<&str, NodeIndex> = HashMap::new();

        for (stage, action) in pipeline.actions() {
            let node = graph.add_node(action.name().to_string());
            name_to_index.insert(action.name().to_string(), node);
            stage_of.insert(action.name().to_string(), stage.name.clone());

            for output in action.outputs() {
                producer_of.insert(output.name.as_str(), node);
            }
        }

        for (_, action) in pipeline.actions() {
            let consumer = name_to_index[action.name()];
            for input in action.inputs() {
                let producer = producer_of.get(input.name.as_str()).ok_or_else(|| {
                    ShipflowError::unresolved(action.name(), &input.name)
                })?;
                graph.add_edge(*producer, consumer, input.name.clone());
            }
        }

        Ok(Self {
            graph,
            name_to_index,
            stage_of,
        })
    }

    /// Actions that feed a given action, with the artifact carried
    pub fn feeds_into(&self, action: &str) -> Vec<(String, String)> {
        let Some(node) = self.name_to_index.get(action) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(*node, petgraph::Direction::Incoming)
            .map(|e| (self.graph[e.source()].clone(), e.weight().clone()))
            .collect()
    }

    /// Whether two actions share no artifact path in either direction.
    ///
    /// Actions within a stage may execute concurrently only when this
    /// holds; the external engine owns that schedule.
    pub fn independent(&self, a: &str, b: &str) -> bool {
        let (Some(na), Some(nb)) = (self.name_to_index.get(a), self.name_to_index.get(b)) else {
            return false;
        };
        !petgraph::algo::has_path_connecting(&self.graph, *na, *nb, None)
            && !petgraph::algo::has_path_connecting(&self.graph, *nb, *na, None)
    }

    /// Generate a text rendering of the wiring, in stage order
    pub fn to_text(&self, pipeline: &Pipeline) -> String {
        let mut out = String::new();

        for (i, stage) in pipeline.stages().iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, stage.name));
            for action in &stage.actions {
                out.push_str(&format!("   - {} ({})", action.name(), action.kind_name()));
                let feeds = self.feeds_into(action.name());
                if !feeds.is_empty() {
                    let from: Vec<String> = feeds
                        .iter()
                        .map(|(producer, artifact)| format!("{artifact} from {producer}"))
                        .collect();
                    out.push_str(&format!(" [{}]", from.join(", ")));
                }
                out.push('\n');
            }
        }

        out
    }

    /// Generate a DOT rendering of the wiring
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph delivery {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                out.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    self.graph[from], self.graph[to], self.graph[edge]
                ));
            }
        }

        for (name, node) in &self.name_to_index {
            if self.graph.neighbors_undirected(*node).count() == 0 {
                out.push_str(&format!("    \"{name}\";\n"));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate a Mermaid rendering of the wiring
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");

        for node in self.graph.node_indices() {
            let name = &self.graph[node];
            let stage = self.stage_of.get(name).map(String::as_str).unwrap_or("");
            out.push_str(&format!("    {name}[{name}<br/>{stage}]\n"));
        }

        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                out.push_str(&format!(
                    "    {} -->|{}| {}\n",
                    self.graph[from], self.graph[edge], self.graph[to]
                ));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildspec::{ArtifactRule, BuildDefinition, BuildEnvironment, Phases};
    use crate::pipeline::{Action, Artifact, BuildAction, DeployAction, SourceAction};
    use crate::policy::Identity;
    use std::collections::BTreeMap;

    fn delivery_pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new("api-delivery");
        pipeline.add_stage("Source").unwrap();
        pipeline
            .add_action(
                "Source",
                Action::Source(SourceAction::new(
                    "source",
                    "acme",
                    "svc",
                    "main",
                    "GitHubAccessToken",
                    Artifact::new("SourceOutput"),
                )),
            )
            .unwrap();

        let definition = BuildDefinition::new(
            BuildEnvironment::new("standard:7.0"),
            Phases {
                build: vec!["make".into()],
                ..Phases::default()
            },
            ArtifactRule::new("out", ["template.json"]),
        );
        pipeline.add_stage("Build").unwrap();
        pipeline
            .add_action(
                "Build",
                Action::Build(BuildAction::new(
                    "build",
                    definition,
                    Identity::new("build-identity"),
                    Artifact::new("SourceOutput"),
                    vec![Artifact::new("BuildOutput")],
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
                    Artifact::new("BuildOutput").at_path("template.json"),
                    true,
                    BTreeMap::new(),
                )),
            )
            .unwrap();

        pipeline
    }

    #[test]
    fn test_wiring_edges_follow_artifacts() {
        let pipeline = delivery_pipeline();
        let wiring = ArtifactWiring::build(&pipeline).unwrap();

        let feeds = wiring.feeds_into("build");
        assert_eq!(feeds, vec![("source".to_string(), "SourceOutput".to_string())]);

        let feeds = wiring.feeds_into("deploy");
        assert_eq!(feeds, vec![("build".to_string(), "BuildOutput".to_string())]);
    }

    #[test]
    fn test_chained_actions_are_not_independent() {
        let pipeline = delivery_pipeline();
        let wiring = ArtifactWiring::build(&pipeline).unwrap();

        assert!(!wiring.independent("source", "deploy"));
        assert!(!wiring.independent("source", "build"));
    }

    #[test]
    fn test_dot_rendering_labels_artifacts() {
        let pipeline = delivery_pipeline();
        let wiring = ArtifactWiring::build(&pipeline).unwrap();
        let dot = wiring.to_dot();

        assert!(dot.contains("digraph delivery"));
        assert!(dot.contains("\"source\" -> \"build\" [label=\"SourceOutput\"]"));
        assert!(dot.contains("\"build\" -> \"deploy\" [label=\"BuildOutput\"]"));
    }

    #[test]
    fn test_mermaid_rendering() {
        let pipeline = delivery_pipeline();
        let wiring = ArtifactWiring::build(&pipeline).unwrap();
        let mermaid = wiring.to_mermaid();

        assert!(mermaid.contains("graph LR"));
        assert!(mermaid.contains("source -->|SourceOutput| build"));
    }

    #[test]
    fn test_text_rendering_groups_by_stage() {
        let pipeline = delivery_pipeline();
        let wiring = ArtifactWiring::build(&pipeline).unwrap();
        let text = wiring.to_text(&pipeline);

        assert!(text.contains("1. Source"));
        assert!(text.contains("2. Build"));
        assert!(text.contains("3. Deploy"));
        assert!(text.contains("BuildOutput from build"));
    }
}
