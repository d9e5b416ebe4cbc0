use super::anchors::Anchors;
use crate::core::{Dag, NodeId, VertexIdx, VizEdge};
use crate::error::CompactError;
use std::mem;
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    /// On the active path
    Grey,
    /// Fully explored
    Black,
}

/// One vertex of the explicit DFS stack
#[derive(Debug)]
struct Frame {
    vertex: VertexIdx,
    next_successor: usize,
    /// Whether entering this vertex pushed a node-point
    pushed: bool,
}

/// State of one depth-first compaction walk
pub(super) struct Traversal<'a> {
    dag: &'a Dag,
    /// Vertex index -> materialized node, if the vertex is a node-point
    node_points: &'a [Option<NodeId>],
    anchors: Anchors,
    marks: Vec<Mark>,
    /// Node-points from the nearest ancestor down to the frontier; the top is
    /// the current anchor. Anchors carry no vertex.
    npath: Vec<(NodeId, Option<VertexIdx>)>,
    /// Interstitial commits seen since the current anchor
    path: Vec<VertexIdx>,
    edges: Vec<VizEdge>,
}

impl<'a> Traversal<'a> {
    pub(super) fn new(dag: &'a Dag, node_points: &'a [Option<NodeId>], anchors: Anchors) -> Self {
        Self {
            dag,
            node_points,
            anchors,
            marks: vec![Mark::White; dag.vertex_count()],
            npath: Vec::new(),
            path: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Walk from every source vertex, returning the synthesized edges
    pub(super) fn run(mut self) -> Result<Vec<VizEdge>, CompactError> {
        for source in self.dag.sources() {
            self.npath.push((self.anchors.source, None));
            self.walk(source)?;
            self.npath.pop();
        }

        Ok(self.edges)
    }

    fn walk(&mut self, root: VertexIdx) -> Result<(), CompactError> {
        let mut stack: Vec<Frame> = Vec::new();
        if let Some(frame) = self.enter(root)? {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            let successors = self.dag.successors(frame.vertex);
            if let Some(&next) = successors.get(frame.next_successor) {
                frame.next_successor += 1;
                if let Some(child) = self.enter(next)? {
                    stack.push(child);
                }
            } else if let Some(done) = stack.pop() {
                self.leave(done);
            }
        }

        Ok(())
    }

    /// Visit `v` under the current anchor. Returns a frame when `v` must be
    /// descended into.
    fn enter(&mut self, v: VertexIdx) -> Result<Option<Frame>, CompactError> {
        let Some(&(from, from_vertex)) = self.npath.last() else {
            return Ok(None);
        };

        match self.marks[v] {
            Mark::Black => {
                if from_vertex == Some(v) {
                    warn!(commit = self.dag.id(v), "unexpected revisit of current anchor");
                } else if let Some(target) = self.node_points[v] {
                    trace!(commit = self.dag.id(v), "convergence on visited node-point");
                    self.emit(from, target);
                } else {
                    warn!(commit = self.dag.id(v), "unexpected revisit of interstitial commit");
                }
                return Ok(None);
            }
            Mark::Grey => {
                return Err(CompactError::Cycle {
                    commit: self.dag.id(v).to_string(),
                });
            }
            Mark::White => {}
        }

        self.marks[v] = Mark::Grey;

        let mut pushed = false;
        if from_vertex != Some(v) {
            if let Some(node) = self.node_points[v] {
                self.emit(from, node);
                self.npath.push((node, Some(v)));
                pushed = true;
            } else {
                self.path.push(v);
            }
        }

        if self.dag.vertex(v).is_sink() {
            let head = self.npath.last().map_or(from, |&(head, _)| head);
            self.emit(head, self.anchors.sink);
        }

        Ok(Some(Frame {
            vertex: v,
            next_successor: 0,
            pushed,
        }))
    }

    fn leave(&mut self, frame: Frame) {
        self.marks[frame.vertex] = Mark::Black;
        if frame.pushed {
            self.npath.pop();
        }
    }

    /// Close an edge, handing it the accumulated interstitial path
    fn emit(&mut self, from: NodeId, to: NodeId) {
        let path: Vec<String> = mem::take(&mut self.path)
            .into_iter()
            .map(|v| self.dag.id(v).to_string())
            .collect();
        let class = self.anchors.classify(from, to, path.len());
        self.edges.push(VizEdge::new(from, to, path, class));
    }
}
