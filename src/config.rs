//! JSON documents the matcher is fed from.
//!
//! - the skill-tree config (`skillTreeConfig.json`): trees, their transform
//!   strings and their nodes
//! - an artifact list extracted from artwork: ids, labels, and either a
//!   position or the path data to anchor one from

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorStrategy;
use crate::errors::ConfigError;
use crate::label::NodeRef;
use crate::log::info;
use crate::model::{Artifact, ReferenceNode};
use crate::transform::{AffineTransform, TransformTable};
use crate::types::{PartitionKey, Point};

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Names a tree's transform string in diagnostics
fn transform_source_name(key: &str) -> String {
    format!("trees.{key}.transform")
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidDocument {
        message: message.into(),
    }
}

// ============================================================================
// Skill-tree document
// ============================================================================

/// The skill-tree config document. Fields the matcher has no use for
/// (names, descriptions, prerequisites, paths) are ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTreeDocument {
    pub version: String,
    pub max_skill_points: u32,
    pub trees: BTreeMap<String, TreeDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDocument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// SVG transform list placing the tree in the artwork; empty means identity
    #[serde(default)]
    pub transform: String,
    pub nodes: Vec<NodeDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_max_points")]
    pub max_points: u32,
}

fn default_max_points() -> u32 {
    1
}

impl SkillTreeDocument {
    /// Parse and validate a document. `name` labels errors.
    pub fn from_json(name: &str, text: &str) -> Result<Self, ConfigError> {
        let doc: SkillTreeDocument = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            name: name.to_string(),
            source,
        })?;
        doc.validate()?;
        info!(
            trees = doc.trees.len(),
            nodes = doc.trees.values().map(|t| t.nodes.len()).sum::<usize>(),
            "loaded skill-tree document"
        );
        Ok(doc)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        Self::from_json(&path.display().to_string(), &read_file(path)?)
    }

    /// Structural checks: a version and a positive point budget, then per
    /// tree an id and a parseable transform. Node ids must be unique across
    /// trees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(invalid("config must have a version"));
        }
        if self.max_skill_points < 1 {
            return Err(invalid("config must have a maxSkillPoints of at least 1"));
        }
        if self.trees.is_empty() {
            return Err(invalid("config has no trees"));
        }

        let mut seen = HashSet::new();
        for (key, tree) in &self.trees {
            if key.trim().is_empty() {
                return Err(invalid("tree keys must not be empty"));
            }
            if tree.id.trim().is_empty() {
                return Err(invalid(format!("tree {key} has no id")));
            }
            AffineTransform::parse_named(&transform_source_name(key), &tree.transform)?;
            for node in &tree.nodes {
                if node.id.trim().is_empty() {
                    return Err(invalid(format!("tree {key} has a node without an id")));
                }
                if !seen.insert(node.id.as_str()) {
                    return Err(invalid(format!("duplicate node id {}", node.id)));
                }
            }
        }
        Ok(())
    }

    /// All nodes, tree by tree in key order, each tree's nodes in document
    /// order. A node's partition is its tree's key.
    pub fn reference_nodes(&self) -> Result<Vec<ReferenceNode>, ConfigError> {
        let mut nodes = Vec::new();
        for (key, tree) in &self.trees {
            for node in &tree.nodes {
                let point = Point::try_new(node.x, node.y).map_err(|source| ConfigError::InvalidCoordinate {
                    id: node.id.clone(),
                    source,
                })?;
                nodes.push(ReferenceNode::new(node.id.clone(), point, key.as_str()).with_max_points(node.max_points));
            }
        }
        Ok(nodes)
    }

    /// Each tree's parsed transform, keyed by tree key
    pub fn transform_table(&self) -> Result<TransformTable, ConfigError> {
        let mut table = TransformTable::new();
        for (key, tree) in &self.trees {
            let transform = AffineTransform::parse_named(&transform_source_name(key), &tree.transform)?;
            table.insert(key.as_str(), transform);
        }
        Ok(table)
    }
}

// ============================================================================
// Artifact document
// ============================================================================

/// One artifact as written in an artifact document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<PartitionKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Path data to anchor from when `x`/`y` are absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<AnchorStrategy>,
}

impl ArtifactRecord {
    /// Build the artifact: the partition comes from `tree`, else the label,
    /// else the id; the point from `x`/`y`, else the anchor of `d`.
    pub fn resolve(&self, default_anchor: AnchorStrategy) -> Result<Artifact, ConfigError> {
        let partition = self
            .tree
            .clone()
            .or_else(|| {
                self.label
                    .as_deref()
                    .and_then(NodeRef::parse_any)
                    .map(|r| r.partition)
            })
            .or_else(|| NodeRef::parse_any(&self.id).map(|r| r.partition))
            .ok_or_else(|| ConfigError::MissingPartition { id: self.id.clone() })?;

        let point = match (self.x, self.y, self.d.as_deref()) {
            (Some(x), Some(y), _) => Point::try_new(x, y).map_err(|source| ConfigError::InvalidCoordinate {
                id: self.id.clone(),
                source,
            })?,
            (_, _, Some(d)) => self
                .anchor
                .unwrap_or(default_anchor)
                .anchor_path(d)
                .ok_or_else(|| ConfigError::MissingPoint { id: self.id.clone() })?,
            _ => return Err(ConfigError::MissingPoint { id: self.id.clone() }),
        };

        let artifact = Artifact::new(self.id.clone(), point, partition);
        Ok(match &self.label {
            Some(label) => artifact.with_label(label.clone()),
            None => artifact,
        })
    }
}

/// Parse an artifact document (a JSON array of records) and resolve every
/// record, keeping document order
pub fn artifacts_from_json(
    name: &str,
    text: &str,
    default_anchor: AnchorStrategy,
) -> Result<Vec<Artifact>, ConfigError> {
    let records: Vec<ArtifactRecord> = serde_json::from_str(text).map_err(|source| ConfigError::Json {
        name: name.to_string(),
        source,
    })?;
    let artifacts = records
        .iter()
        .map(|r| r.resolve(default_anchor))
        .collect::<Result<Vec<_>, _>>()?;
    info!(artifacts = artifacts.len(), "loaded artifact document");
    Ok(artifacts)
}

pub fn load_artifacts(path: impl AsRef<Path>, default_anchor: AnchorStrategy) -> Result<Vec<Artifact>, ConfigError> {
    let path = path.as_ref();
    artifacts_from_json(&path.display().to_string(), &read_file(path)?, default_anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransformParseError;

    const CONFIG: &str = r##"{
        "version": "1.0",
        "maxSkillPoints": 75,
        "trees": {
            "B": {
                "id": "B",
                "name": "Mobility",
                "color": "#ffd400",
                "transform": "translate(221.93716, 39.335736)",
                "nodes": [
                    { "id": "tree-b-node-0", "x": 10, "y": 20, "maxPoints": 5, "name": "Nimble" }
                ],
                "paths": []
            },
            "A": {
                "id": "A",
                "transform": "matrix(-1,0,0,1,552.10903,48.512262)",
                "nodes": [
                    { "id": "tree-a-node-0", "x": 1, "y": 2, "maxPoints": 1 },
                    { "id": "tree-a-node-1", "x": 3, "y": 4, "maxPoints": 3 }
                ]
            }
        }
    }"##;

    #[test]
    fn skill_tree_document_loads_nodes_in_key_order() {
        let doc = SkillTreeDocument::from_json("config", CONFIG).unwrap();
        let ids: Vec<_> = doc.reference_nodes().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, ["tree-a-node-0", "tree-a-node-1", "tree-b-node-0"]);
    }

    #[test]
    fn skill_tree_document_carries_partition_and_max_points() {
        let doc = SkillTreeDocument::from_json("config", CONFIG).unwrap();
        let nodes = doc.reference_nodes().unwrap();
        assert_eq!(nodes[2].partition, PartitionKey::new("B"));
        assert_eq!(nodes[2].max_points, 5);
        assert!(nodes[2].is_multi_point());
        assert!(!nodes[0].is_multi_point());
    }

    #[test]
    fn skill_tree_document_parses_transforms() {
        let doc = SkillTreeDocument::from_json("config", CONFIG).unwrap();
        let table = doc.transform_table().unwrap();
        assert_eq!(
            table.get(&PartitionKey::new("B")),
            Some(&AffineTransform::translate(221.93716, 39.335736))
        );
        assert_eq!(
            table.get(&PartitionKey::new("A")),
            Some(&AffineTransform::new(-1.0, 0.0, 0.0, 1.0, 552.10903, 48.512262))
        );
    }

    #[test]
    fn skill_tree_document_rejects_bad_transform() {
        let text = CONFIG.replace("translate(221.93716, 39.335736)", "translate(1,2,3)");
        match SkillTreeDocument::from_json("config", &text) {
            Err(ConfigError::Transform(TransformParseError::Arity { function, got, .. })) => {
                assert_eq!(function, "translate");
                assert_eq!(got, 3);
            }
            other => panic!("expected transform arity error, got {other:?}"),
        }

        let text = CONFIG.replace("translate(221.93716, 39.335736)", "shear(2)");
        assert!(matches!(
            SkillTreeDocument::from_json("config", &text),
            Err(ConfigError::Transform(TransformParseError::Syntax { .. }))
        ));
    }

    #[test]
    fn skill_tree_document_validation() {
        let no_version = CONFIG.replace(r#""version": "1.0""#, r#""version": """#);
        assert!(matches!(
            SkillTreeDocument::from_json("config", &no_version),
            Err(ConfigError::InvalidDocument { .. })
        ));

        let no_points = CONFIG.replace(r#""maxSkillPoints": 75"#, r#""maxSkillPoints": 0"#);
        assert!(matches!(
            SkillTreeDocument::from_json("config", &no_points),
            Err(ConfigError::InvalidDocument { .. })
        ));

        let duplicate = CONFIG.replace("tree-a-node-1", "tree-a-node-0");
        match SkillTreeDocument::from_json("config", &duplicate) {
            Err(ConfigError::InvalidDocument { message }) => assert!(message.contains("tree-a-node-0"), "{message}"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn skill_tree_document_reports_malformed_json() {
        assert!(matches!(
            SkillTreeDocument::from_json("config", "{"),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn artifacts_resolve_partition_from_tree_label_or_id() {
        let text = r#"[
            { "id": "path1", "tree": "c", "x": 1, "y": 2 },
            { "id": "path2", "label": "Tree D container node 3", "x": 3, "y": 4 },
            { "id": "container-b-1-2", "x": 5, "y": 6 }
        ]"#;
        let artifacts = artifacts_from_json("artifacts", text, AnchorStrategy::default()).unwrap();
        let partitions: Vec<_> = artifacts.iter().map(|a| a.partition.as_str().to_string()).collect();
        assert_eq!(partitions, ["C", "D", "B"]);
        assert_eq!(artifacts[1].label.as_deref(), Some("Tree D container node 3"));
        assert_eq!(artifacts[2].point, Point::new(5.0, 6.0));
    }

    #[test]
    fn artifacts_anchor_from_path_data() {
        let text = r#"[
            { "id": "container-a-0", "d": "m 100,200 h 20 v 10 h -20 z" },
            { "id": "container-a-1", "d": "M 0,0 L 10,0 L 10,4 L 0,4 Z", "anchor": "bounds-center" }
        ]"#;
        let artifacts = artifacts_from_json("artifacts", text, AnchorStrategy::default()).unwrap();
        assert_eq!(artifacts[0].point, Point::new(100.0, 200.0));
        assert_eq!(artifacts[1].point, Point::new(5.0, 2.0));
    }

    #[test]
    fn artifacts_without_point_or_partition_fail() {
        let no_point = r#"[{ "id": "container-a-0" }]"#;
        assert!(matches!(
            artifacts_from_json("artifacts", no_point, AnchorStrategy::default()),
            Err(ConfigError::MissingPoint { .. })
        ));

        let empty_path = r#"[{ "id": "container-a-0", "d": "z" }]"#;
        assert!(matches!(
            artifacts_from_json("artifacts", empty_path, AnchorStrategy::default()),
            Err(ConfigError::MissingPoint { .. })
        ));

        let no_partition = r#"[{ "id": "path7", "x": 1, "y": 1 }]"#;
        assert!(matches!(
            artifacts_from_json("artifacts", no_partition, AnchorStrategy::default()),
            Err(ConfigError::MissingPartition { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SkillTreeDocument::load("/nonexistent/skillmatch/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "{err:?}");
    }
}
