//! Reference nodes, artifacts, and the matches a run pairs them into.

use serde::{Deserialize, Serialize};

use crate::types::{PartitionKey, Point};

/// A skill-tree node with a trustworthy id, positioned in its tree's local
/// space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub id: String,
    /// Local (untransformed) position
    pub point: Point,
    pub partition: PartitionKey,
    /// Skill points the node can hold. Callers use it to pick which nodes
    /// get containers; the matcher ignores it.
    #[serde(default = "default_max_points")]
    pub max_points: u32,
}

fn default_max_points() -> u32 {
    1
}

impl ReferenceNode {
    pub fn new(id: impl Into<String>, point: Point, partition: impl Into<PartitionKey>) -> Self {
        Self {
            id: id.into(),
            point,
            partition: partition.into(),
            max_points: default_max_points(),
        }
    }

    pub fn with_max_points(mut self, max_points: u32) -> Self {
        self.max_points = max_points;
        self
    }

    /// Nodes holding more than one point are drawn with a container
    pub fn is_multi_point(&self) -> bool {
        self.max_points > 1
    }
}

/// A shape extracted from artwork. Its id may be stale; its point is
/// already in artwork space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    /// Label from the artwork, e.g. `Tree A container node 1-2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub point: Point,
    pub partition: PartitionKey,
}

impl Artifact {
    pub fn new(id: impl Into<String>, point: Point, partition: impl Into<PartitionKey>) -> Self {
        Self {
            id: id.into(),
            label: None,
            point,
            partition: partition.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// An artifact paired with the reference node it was assigned to
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Match {
    pub artifact: Artifact,
    pub node: ReferenceNode,
    /// The node's transformed position
    pub node_point: Point,
    /// Distance between the artifact and `node_point`
    pub distance: f64,
}

/// Result of a matching run. Both lists follow artifact input order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchOutcome {
    pub mapping: Vec<Match>,
    pub unmatched: Vec<Artifact>,
}

impl MatchOutcome {
    /// Node id assigned to the artifact with `artifact_id`, if any
    pub fn node_for(&self, artifact_id: &str) -> Option<&str> {
        self.mapping
            .iter()
            .find(|m| m.artifact.id == artifact_id)
            .map(|m| m.node.id.as_str())
    }

    pub fn is_unmatched(&self, artifact_id: &str) -> bool {
        self.unmatched.iter().any(|a| a.id == artifact_id)
    }

    pub fn matched_count(&self) -> usize {
        self.mapping.len()
    }

    /// Largest accepted distance, or `None` when nothing matched
    pub fn max_distance(&self) -> Option<f64> {
        self.mapping.iter().map(|m| m.distance).reduce(f64::max)
    }
}
