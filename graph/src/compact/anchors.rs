use crate::core::{Anchor, EdgeClass, NodeId, Position, VizNode};

/// Canvas geometry the anchors are pinned against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    /// Horizontal inset of the anchors from the canvas edges
    pub margin: f64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            margin: 20.0,
        }
    }
}

impl Canvas {
    /// Source on the left edge, sink on the right, both vertically centered
    pub fn anchor_position(&self, anchor: Anchor) -> Position {
        let x = match anchor {
            Anchor::Source => self.margin,
            Anchor::Sink => self.width - self.margin,
        };
        Position {
            x,
            y: self.height / 2.0,
        }
    }

    pub fn anchor_node(&self, anchor: Anchor) -> VizNode {
        VizNode::Anchor {
            anchor,
            position: self.anchor_position(anchor),
        }
    }
}

/// The two anchor nodes of one compacted graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub source: NodeId,
    pub sink: NodeId,
}

impl Anchors {
    pub fn touches(&self, from: NodeId, to: NodeId) -> bool {
        from == self.source || to == self.sink
    }

    /// Boundary edges with nothing to summarize are styled as anchor links
    pub fn classify(&self, from: NodeId, to: NodeId, path_len: usize) -> EdgeClass {
        if path_len == 0 && self.touches(from, to) {
            EdgeClass::Anchor
        } else {
            EdgeClass::Commit
        }
    }
}
