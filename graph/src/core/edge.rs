use super::node::NodeId;
use serde::Serialize;

/// An edge of the compacted commit graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VizEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Non-materialized commits this edge summarizes, in walk order
    pub path: Vec<String>,
    pub class: EdgeClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClass {
    /// Summarizes a run of commits between node-points
    Commit,
    /// Pure attachment to a source/sink anchor
    Anchor,
}

impl VizEdge {
    pub fn new(source: NodeId, target: NodeId, path: Vec<String>, class: EdgeClass) -> Self {
        Self {
            source,
            target,
            path,
            class,
        }
    }

    /// Stroke width grows with the square root of the summarized path
    pub fn stroke_width(&self, scale: f64) -> f64 {
        if self.path.is_empty() {
            1.0
        } else {
            scale * (self.path.len() as f64).sqrt()
        }
    }
}
