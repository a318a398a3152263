//! Checks for the places where nearest-node matching can silently go wrong.
//!
//! The matcher resolves every ambiguity by input order and says nothing.
//! These functions list the cases worth a look before a mapping is trusted.

use serde::Serialize;

use crate::errors::ConfigError;
use crate::label::NodeRef;
use crate::matcher::place_nodes;
use crate::model::{Artifact, MatchOutcome, ReferenceNode};
use crate::transform::TransformTable;
use crate::types::{PartitionKey, Tolerance};

/// Two same-partition nodes close enough that one artifact could land
/// within tolerance of both
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AmbiguousPair {
    pub partition: PartitionKey,
    pub first: String,
    pub second: String,
    pub distance: f64,
}

/// A node within tolerance of several artifacts
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContestedNode {
    pub node: String,
    /// Competing artifact ids, in input order
    pub artifacts: Vec<String>,
}

/// A match whose node disagrees with the artifact's label
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LabelMismatch {
    pub artifact: String,
    /// Node id the label claims
    pub expected: String,
    /// Node id the artifact actually matched
    pub matched: String,
    pub distance: f64,
}

/// Everything [`audit`] found
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AuditReport {
    pub ambiguous: Vec<AmbiguousPair>,
    pub contested: Vec<ContestedNode>,
    pub mismatches: Vec<LabelMismatch>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.ambiguous.is_empty() && self.contested.is_empty() && self.mismatches.is_empty()
    }
}

/// Node pairs in one partition whose transformed points are at most
/// `2 × tolerance` apart, in input order
pub fn ambiguous_pairs(
    reference_nodes: &[ReferenceNode],
    transforms: &TransformTable,
    tolerance: Tolerance,
) -> Result<Vec<AmbiguousPair>, ConfigError> {
    let placed = place_nodes(reference_nodes, transforms)?;
    let limit = 2.0 * tolerance.raw();

    let mut pairs = Vec::new();
    for (i, first) in reference_nodes.iter().enumerate() {
        for (j, second) in reference_nodes.iter().enumerate().skip(i + 1) {
            if first.partition != second.partition {
                continue;
            }
            let distance = placed[i].distance(placed[j]);
            if distance <= limit {
                pairs.push(AmbiguousPair {
                    partition: first.partition.clone(),
                    first: first.id.clone(),
                    second: second.id.clone(),
                    distance,
                });
            }
        }
    }
    Ok(pairs)
}

/// Nodes within tolerance of two or more same-partition artifacts, in node
/// input order
pub fn contested_nodes(
    artifacts: &[Artifact],
    reference_nodes: &[ReferenceNode],
    transforms: &TransformTable,
    tolerance: Tolerance,
) -> Result<Vec<ContestedNode>, ConfigError> {
    let placed = place_nodes(reference_nodes, transforms)?;

    let contested = reference_nodes
        .iter()
        .zip(&placed)
        .filter_map(|(node, point)| {
            let competing: Vec<String> = artifacts
                .iter()
                .filter(|a| a.partition == node.partition && tolerance.accepts(a.point.distance(*point)))
                .map(|a| a.id.clone())
                .collect();
            (competing.len() > 1).then(|| ContestedNode {
                node: node.id.clone(),
                artifacts: competing,
            })
        })
        .collect();
    Ok(contested)
}

/// Matches where the artifact's label (or, failing that, its id) names a
/// different node than the one it matched
pub fn label_mismatches(outcome: &MatchOutcome) -> Vec<LabelMismatch> {
    outcome
        .mapping
        .iter()
        .filter_map(|m| {
            let claimed = m
                .artifact
                .label
                .as_deref()
                .and_then(NodeRef::parse_any)
                .or_else(|| NodeRef::parse_any(&m.artifact.id))?;
            let expected = claimed.node_id();
            (expected != m.node.id).then(|| LabelMismatch {
                artifact: m.artifact.id.clone(),
                expected,
                matched: m.node.id.clone(),
                distance: m.distance,
            })
        })
        .collect()
}

/// Run every check. `outcome` should come from matching the same inputs.
pub fn audit(
    artifacts: &[Artifact],
    reference_nodes: &[ReferenceNode],
    transforms: &TransformTable,
    tolerance: Tolerance,
    outcome: &MatchOutcome,
) -> Result<AuditReport, ConfigError> {
    Ok(AuditReport {
        ambiguous: ambiguous_pairs(reference_nodes, transforms, tolerance)?,
        contested: contested_nodes(artifacts, reference_nodes, transforms, tolerance)?,
        mismatches: label_mismatches(outcome),
    })
}
