//! The update request document handed to the inventory service.

use super::ResolvedDependency;
use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Static agent identity reported in every request
pub const AGENT_NAME: &str = "fs-agent";
/// Agent version reported alongside [`AGENT_NAME`]
pub const AGENT_VERSION: &str = "1.0";
/// Request type of every update
pub const REQUEST_TYPE: &str = "UPDATE";

/// How the inventory service merges the request with existing data
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateType {
    /// Replace the project's dependency list
    #[default]
    Override,
    /// Add to the project's dependency list
    Append,
}

impl UpdateType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "OVERRIDE",
            Self::Append => "APPEND",
        }
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OVERRIDE" => Ok(Self::Override),
            "APPEND" => Ok(Self::Append),
            other => Err(format!(
                "Unknown update type '{other}'. Valid options: OVERRIDE, APPEND"
            )),
        }
    }
}

/// Project coordinates used when no project token is known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCoordinates {
    #[serde(rename = "artifactId")]
    pub artifact_id: String,
}

/// How a project entry names its target project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectRef {
    /// An existing project, by token
    Token {
        #[serde(rename = "projectToken")]
        project_token: String,
    },
    /// A project addressed by name; created on first upload
    Coordinates { coordinates: ProjectCoordinates },
}

impl ProjectRef {
    /// Human-readable label for logs
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Token { project_token } => project_token,
            Self::Coordinates { coordinates } => &coordinates.artifact_id,
        }
    }
}

/// One project and its dependency trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(flatten)]
    pub project: ProjectRef,
    pub dependencies: Vec<ResolvedDependency>,
}

/// The complete update request written once per run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub update_type: UpdateType,
    #[serde(rename = "type")]
    pub request_type: String,
    pub agent: String,
    pub agent_version: String,
    pub plugin_version: String,
    pub org_token: String,
    pub product: String,
    pub product_version: String,
    pub time_stamp: i64,
    pub projects: Vec<ProjectEntry>,
}

impl UpdateRequest {
    /// Total dependencies across every project, children included.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.projects
            .iter()
            .flat_map(|p| &p.dependencies)
            .map(ResolvedDependency::subtree_size)
            .sum()
    }
}
