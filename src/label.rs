//! Naming conventions tying artwork shapes to skill-tree nodes.
//!
//! The same node shows up under three spellings:
//!
//! | where            | example                     |
//! |------------------|-----------------------------|
//! | artwork label    | `Tree A container node 1-2` |
//! | container id     | `container-a-1-2`           |
//! | skill-tree node  | `tree-a-node-1-2`           |
//!
//! [`NodeRef`] parses any of them and renders the others.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::types::PartitionKey;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Tree\s+([A-Za-z0-9]+)\s+container\s+node\s+(\S+)\s*$").expect("label pattern is valid")
});

static CONTAINER_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^container-([A-Za-z0-9]+)-(.+)$").expect("container id pattern is valid"));

static NODE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tree-([A-Za-z0-9]+)-node-(.+)$").expect("node id pattern is valid"));

/// A tree plus the node's position suffix within it (`1-2`, `0`, ...)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub partition: PartitionKey,
    pub suffix: String,
}

impl NodeRef {
    pub fn new(partition: impl Into<PartitionKey>, suffix: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            suffix: suffix.into(),
        }
    }

    /// Parse an artwork label like `Tree A container node 1-2`
    pub fn from_label(label: &str) -> Option<Self> {
        Self::capture(&LABEL_RE, label)
    }

    /// Parse a container id like `container-a-1-2`
    pub fn from_container_id(id: &str) -> Option<Self> {
        Self::capture(&CONTAINER_ID_RE, id)
    }

    /// Parse a skill-tree node id like `tree-a-node-1-2`
    pub fn from_node_id(id: &str) -> Option<Self> {
        Self::capture(&NODE_ID_RE, id)
    }

    /// Try the label, container-id and node-id spellings in turn
    pub fn parse_any(text: &str) -> Option<Self> {
        Self::from_label(text)
            .or_else(|| Self::from_container_id(text))
            .or_else(|| Self::from_node_id(text))
    }

    fn capture(re: &Regex, text: &str) -> Option<Self> {
        let caps = re.captures(text)?;
        Some(Self::new(&caps[1], &caps[2]))
    }

    /// `tree-a-node-1-2`
    pub fn node_id(&self) -> String {
        format!("tree-{}-node-{}", self.tree_slug(), self.suffix)
    }

    /// `container-a-1-2`
    pub fn container_id(&self) -> String {
        format!("container-{}-{}", self.tree_slug(), self.suffix)
    }

    /// `Tree A container node 1-2`
    pub fn label(&self) -> String {
        format!("Tree {} container node {}", self.partition, self.suffix)
    }

    fn tree_slug(&self) -> String {
        self.partition.as_str().to_ascii_lowercase()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.partition, self.suffix)
    }
}

/// `container-a-1-2` to `tree-a-node-1-2`
pub fn container_id_to_node_id(id: &str) -> Option<String> {
    NodeRef::from_container_id(id).map(|r| r.node_id())
}

/// `tree-a-node-1-2` to `container-a-1-2`
pub fn node_id_to_container_id(id: &str) -> Option<String> {
    NodeRef::from_node_id(id).map(|r| r.container_id())
}

/// The node id an artwork label claims to belong to
pub fn expected_node_id(label: &str) -> Option<String> {
    NodeRef::from_label(label).map(|r| r.node_id())
}

/// The tree of a skill-tree node id
pub fn partition_of_node_id(id: &str) -> Option<PartitionKey> {
    NodeRef::from_node_id(id).map(|r| r.partition)
}
