use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of commit ID characters shown on synthesized commit nodes
pub const SHORT_ID_LEN: usize = 7;

/// Index of a node inside a compacted graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// A deployed or observed instance pinned to a specific commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedInstance {
    pub commit: String,
    pub name: String,
    /// Any other fields from the input document, kept for the renderer
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackedInstance {
    pub fn new(commit: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }
}

/// Which end of the graph an anchor bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Source,
    Sink,
}

impl Anchor {
    pub fn name(self) -> &'static str {
        match self {
            Anchor::Source => "source",
            Anchor::Sink => "sink",
        }
    }

    /// Key the anchor is registered under; never a real commit ID
    pub fn key(self) -> &'static str {
        match self {
            Anchor::Source => "virtual-source",
            Anchor::Sink => "virtual-sink",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A materialized node of the compacted commit graph
#[derive(Debug, Clone, PartialEq)]
pub enum VizNode {
    /// Wraps a tracked instance
    Instance(TrackedInstance),
    /// Auto-synthesized merge or branch point
    Commit { commit: String, label: String },
    /// Fixed virtual boundary node
    Anchor { anchor: Anchor, position: Position },
}

impl VizNode {
    /// Build a commit node labeled with the short form of its ID
    pub fn commit(commit: &str) -> Self {
        Self::Commit {
            commit: commit.to_string(),
            label: short_id(commit).to_string(),
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            VizNode::Instance(instance) => &instance.name,
            VizNode::Commit { label, .. } => label,
            VizNode::Anchor { anchor, .. } => anchor.name(),
        }
    }

    /// Commit this node stands for, if any
    pub fn commit_id(&self) -> Option<&str> {
        match self {
            VizNode::Instance(instance) => Some(&instance.commit),
            VizNode::Commit { commit, .. } => Some(commit),
            VizNode::Anchor { .. } => None,
        }
    }

    /// Kind tag consumed by the renderer
    pub fn class(&self) -> &'static str {
        match self {
            VizNode::Instance(_) => "instance",
            VizNode::Commit { .. } => "commit",
            VizNode::Anchor { .. } => "anchor",
        }
    }

    /// Pinned position; only anchors have one
    pub fn position(&self) -> Option<Position> {
        match self {
            VizNode::Anchor { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        matches!(self, VizNode::Anchor { .. })
    }

    pub fn radius(&self) -> f64 {
        match self {
            VizNode::Instance(_) => 35.0,
            VizNode::Commit { .. } => 20.0,
            VizNode::Anchor { .. } => 10.0,
        }
    }
}

/// First [`SHORT_ID_LEN`] characters of a commit ID
pub fn short_id(commit: &str) -> &str {
    match commit.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &commit[..end],
        None => commit,
    }
}
