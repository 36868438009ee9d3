// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 shipflow contributors

//! Permission policy sets
//!
//! Discrete least-privilege grants attached to execution identities.
//! Grants are additive only; there is no deny modeling. shipflow declares
//! grants, it never issues or revokes credentials.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The single action of the canonical secret-read grant
pub const SECRET_READ_ACTION: &str = "secrets:GetSecretValue";

/// The fixed read/auth/write action list of the canonical registry grant
pub const REGISTRY_ACTIONS: &[&str] = &[
    "registry:GetAuthorizationToken",
    "registry:BatchCheckLayerAvailability",
    "registry:GetDownloadUrlForLayer",
    "registry:GetRepositoryPolicy",
    "registry:DescribeRepositories",
    "registry:ListImages",
    "registry:DescribeImages",
    "registry:BatchGetImage",
    "registry:UploadLayerPart",
    "registry:CompleteLayerUpload",
    "registry:PutImage",
];

/// Grant effect. Grants are additive only.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum Effect {
    #[default]
    Allow,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "Allow"),
        }
    }
}

/// A single permission grant: effect, action set, resource identifier set.
///
/// Actions and resources are normalized (sorted, deduplicated) on
/// construction, so structural equality doubles as set equality.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Grant {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

impl Grant {
    /// Create a grant from action and resource lists
    pub fn new<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let mut actions: Vec<String> = actions.into_iter().map(Into::into).collect();
        let mut resources: Vec<String> = resources.into_iter().map(Into::into).collect();
        actions.sort();
        actions.dedup();
        resources.sort();
        resources.dedup();

        Self {
            effect: Effect::Allow,
            actions,
            resources,
        }
    }

    /// Canonical secret-read grant, scoped to a single secret resource
    pub fn secret_read(resource: impl Into<String>) -> Self {
        Self::new([SECRET_READ_ACTION], [resource.into()])
    }

    /// Canonical registry grant: fixed read/auth/write actions.
    ///
    /// An empty resource list means the wildcard scope.
    pub fn registry<R>(resources: R) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let mut resources: Vec<String> = resources.into_iter().map(Into::into).collect();
        if resources.is_empty() {
            resources.push("*".to_string());
        }
        Self::new(REGISTRY_ACTIONS.iter().copied(), resources)
    }

    /// Check whether this grant allows an action on a resource
    pub fn allows(&self, action: &str, resource: &str) -> bool {
        self.actions.iter().any(|a| a == action)
            && self.resources.iter().any(|r| resource_matches(r, resource))
    }

    /// Check whether this grant lists an action, regardless of resource
    pub fn allows_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// Match a resource identifier against a grant resource pattern.
///
/// Patterns are exact identifiers, a bare `*`, or a trailing-`*` prefix.
fn resource_matches(pattern: &str, resource: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => resource.starts_with(prefix),
        None => pattern == resource,
    }
}

/// An identity's set of attached grants.
///
/// Attachment is idempotent and commutative: attaching grants in any order
/// yields the same effective permission set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicySet {
    grants: Vec<Grant>,
}

impl PolicySet {
    /// Create an empty policy set
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a grant. An identical grant attaches once; duplicates are
    /// not an error.
    pub fn attach(&mut self, grant: Grant) {
        if !self.grants.contains(&grant) {
            self.grants.push(grant);
        }
    }

    /// All attached grants, in attachment order
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// The flattened (action, resource) pairs this set allows.
    ///
    /// Order-independent by construction, which is what makes attachment
    /// commutative.
    pub fn effective(&self) -> BTreeSet<(String, String)> {
        self.grants
            .iter()
            .flat_map(|g| {
                g.actions.iter().flat_map(move |a| {
                    g.resources.iter().map(move |r| (a.clone(), r.clone()))
                })
            })
            .collect()
    }

    /// Check whether any attached grant allows an action on a resource
    pub fn allows(&self, action: &str, resource: &str) -> bool {
        self.grants.iter().any(|g| g.allows(action, resource))
    }

    /// Check whether any attached grant lists an action
    pub fn allows_action(&self, action: &str) -> bool {
        self.grants.iter().any(|g| g.allows_action(action))
    }

    /// Render the JSON policy document for this set
    pub fn to_document(&self) -> serde_json::Value {
        serde_json::json!({
            "version": "1",
            "statements": self.grants.iter().map(|g| {
                serde_json::json!({
                    "effect": g.effect.to_string(),
                    "actions": g.actions,
                    "resources": g.resources,
                })
            }).collect::<Vec<_>>(),
        })
    }
}

/// An execution identity: the principal on whose behalf actions run and
/// against which grants are evaluated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub policies: PolicySet,
}

impl Identity {
    /// Create an identity with an empty policy set
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policies: PolicySet::new(),
        }
    }

    /// Attach a grant to this identity (idempotent)
    pub fn attach(&mut self, grant: Grant) {
        self.policies.attach(grant);
    }
}
