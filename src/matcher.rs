//! Nearest-node matching of artifacts against transformed reference nodes.
//!
//! Every reference node is moved into artwork space with its partition's
//! transform, then each artifact, in input order, takes the closest
//! same-partition node. Distance ties go to the node listed first. Nothing
//! is re-balanced afterwards: when two artifacts sit near one node, the
//! earlier artifact wins it and the later one falls back to whatever is
//! left. [`crate::audit`] has the checks for spotting that.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::log::{debug, warn};
use crate::model::{Artifact, Match, MatchOutcome, ReferenceNode};
use crate::transform::{AffineTransform, TransformTable};
use crate::types::{Point, Tolerance};

/// Knobs for a matching run
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// Largest accepted distance, inclusive
    pub tolerance: Tolerance,
    /// Each reference node may be claimed by at most one artifact
    #[serde(default = "default_exclusive")]
    pub exclusive: bool,
}

fn default_exclusive() -> bool {
    true
}

impl MatchOptions {
    /// Exclusive matching with the given tolerance
    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            exclusive: default_exclusive(),
        }
    }

    /// Validate a raw tolerance and build exclusive options from it
    pub fn try_with_tolerance(tolerance: f64) -> Result<Self, ConfigError> {
        Tolerance::try_new(tolerance)
            .map(Self::new)
            .map_err(|source| ConfigError::InvalidTolerance { source })
    }

    pub fn exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }
}

/// Apply `transform` to `point`
#[inline]
pub fn transform_point(point: Point, transform: &AffineTransform) -> Point {
    transform.apply(point)
}

/// Move every reference node into artwork space, in input order.
///
/// Fails on the first node whose partition has no transform.
pub fn place_nodes(
    reference_nodes: &[ReferenceNode],
    transforms: &TransformTable,
) -> Result<Vec<Point>, ConfigError> {
    reference_nodes
        .iter()
        .map(|node| {
            transforms
                .require(&node.partition)
                .map(|t| transform_point(node.point, t))
        })
        .collect()
}

/// Assign each artifact to its nearest transformed reference node.
///
/// Artifacts with no same-partition candidate left, or whose nearest
/// candidate is farther than the tolerance, go to `unmatched`. Both output
/// lists keep artifact input order.
///
/// Fails with [`ConfigError::MissingTransform`] if any artifact or node
/// names a partition the table does not cover (artifacts are checked first).
pub fn match_artifacts(
    artifacts: &[Artifact],
    reference_nodes: &[ReferenceNode],
    transforms: &TransformTable,
    options: &MatchOptions,
) -> Result<MatchOutcome, ConfigError> {
    for artifact in artifacts {
        transforms.require(&artifact.partition)?;
    }
    let placed = place_nodes(reference_nodes, transforms)?;

    let mut consumed = vec![false; reference_nodes.len()];
    let mut outcome = MatchOutcome::default();

    for artifact in artifacts {
        let mut best: Option<(usize, f64)> = None;
        for (idx, node) in reference_nodes.iter().enumerate() {
            if node.partition != artifact.partition || (options.exclusive && consumed[idx]) {
                continue;
            }
            let distance = artifact.point.distance(placed[idx]);
            if distance.is_nan() {
                continue;
            }
            // Strict comparison keeps the earliest node on ties
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((idx, distance));
            }
        }

        match best {
            Some((idx, distance)) if options.tolerance.accepts(distance) => {
                let node = &reference_nodes[idx];
                debug!(
                    artifact = %artifact.id,
                    node = %node.id,
                    distance,
                    "matched artifact"
                );
                if options.exclusive {
                    consumed[idx] = true;
                }
                outcome.mapping.push(Match {
                    artifact: artifact.clone(),
                    node: node.clone(),
                    node_point: placed[idx],
                    distance,
                });
            }
            #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
            Some((idx, distance)) => {
                warn!(
                    artifact = %artifact.id,
                    nearest = %reference_nodes[idx].id,
                    distance,
                    tolerance = options.tolerance.raw(),
                    "nearest node is out of tolerance"
                );
                outcome.unmatched.push(artifact.clone());
            }
            None => {
                warn!(
                    artifact = %artifact.id,
                    partition = %artifact.partition,
                    "no candidate node in partition"
                );
                outcome.unmatched.push(artifact.clone());
            }
        }
    }

    Ok(outcome)
}

/// A transform table and options bundled for repeated runs
#[derive(Clone, Debug)]
pub struct CoordinateMatcher {
    transforms: TransformTable,
    options: MatchOptions,
}

impl CoordinateMatcher {
    pub fn new(transforms: TransformTable, options: MatchOptions) -> Self {
        Self { transforms, options }
    }

    pub fn transforms(&self) -> &TransformTable {
        &self.transforms
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// See [`match_artifacts`]
    pub fn run(
        &self,
        artifacts: &[Artifact],
        reference_nodes: &[ReferenceNode],
    ) -> Result<MatchOutcome, ConfigError> {
        match_artifacts(artifacts, reference_nodes, &self.transforms, &self.options)
    }

    /// See [`place_nodes`]
    pub fn place(&self, reference_nodes: &[ReferenceNode]) -> Result<Vec<Point>, ConfigError> {
        place_nodes(reference_nodes, &self.transforms)
    }
}
