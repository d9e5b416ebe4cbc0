//! Commit graph compaction.
//!
//! Collapses linear runs of commits into edges and only materializes nodes for
//! tracked instances, merge/branch points, and the two source/sink anchors.
//! Every edge keeps the commits it summarizes so renderers can weight it.

pub mod anchors;
mod walk;

pub use anchors::{Anchors, Canvas};

use crate::core::{Anchor, Dag, EdgeClass, NodeId, TrackedInstance, VizEdge, VizNode};
use crate::error::CompactError;
use std::collections::HashMap;
use tracing::{debug, warn};
use walk::Traversal;

/// Output of compaction: the node and edge sets handed to the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct CommitGraph {
    nodes: Vec<VizNode>,
    edges: Vec<VizEdge>,
    /// Commit ID -> owning node
    by_commit: HashMap<String, NodeId>,
    anchors: Anchors,
    canvas: Canvas,
}

impl CommitGraph {
    fn with_anchors(canvas: &Canvas) -> Self {
        let nodes = vec![
            canvas.anchor_node(Anchor::Source),
            canvas.anchor_node(Anchor::Sink),
        ];
        Self {
            nodes,
            edges: Vec::new(),
            by_commit: HashMap::new(),
            anchors: Anchors {
                source: NodeId(0),
                sink: NodeId(1),
            },
            canvas: *canvas,
        }
    }

    /// Register a node under its commit. Returns `None` if the commit
    /// already has one.
    fn register(&mut self, node: VizNode) -> Option<NodeId> {
        let commit = node.commit_id()?.to_string();
        if self.by_commit.contains_key(&commit) {
            return None;
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.by_commit.insert(commit, id);
        Some(id)
    }

    pub fn nodes(&self) -> &[VizNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[VizEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> &VizNode {
        &self.nodes[id.0]
    }

    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    /// Canvas the anchors were pinned against
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn source(&self) -> NodeId {
        self.anchors.source
    }

    pub fn sink(&self) -> NodeId {
        self.anchors.sink
    }

    /// Node owning a commit, if the commit was materialized
    pub fn node_for(&self, commit: &str) -> Option<NodeId> {
        self.by_commit.get(commit).copied()
    }

    /// All edges from `source` to `target`, in emission order
    pub fn edges_between(&self, source: NodeId, target: NodeId) -> Vec<&VizEdge> {
        self.edges
            .iter()
            .filter(|e| e.source == source && e.target == target)
            .collect()
    }

    pub fn instances(&self) -> impl Iterator<Item = (NodeId, &TrackedInstance)> {
        self.nodes.iter().enumerate().filter_map(|(i, n)| match n {
            VizNode::Instance(instance) => Some((NodeId(i), instance)),
            _ => None,
        })
    }

    pub fn commit_nodes(&self) -> impl Iterator<Item = (NodeId, &VizNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, VizNode::Commit { .. }))
            .map(|(i, n)| (NodeId(i), n))
    }

    /// Edges attached to an anchor with nothing to summarize
    pub fn anchor_edges(&self) -> impl Iterator<Item = &VizEdge> {
        self.edges.iter().filter(|e| e.class == EdgeClass::Anchor)
    }

    pub fn stats(&self) -> CompactStats {
        CompactStats {
            instance_nodes: self.instances().count(),
            commit_nodes: self.commit_nodes().count(),
            edges: self.edges.len(),
            anchor_edges: self.anchor_edges().count(),
            summarized_commits: self.edges.iter().map(|e| e.path.len()).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactStats {
    pub instance_nodes: usize,
    pub commit_nodes: usize,
    pub edges: usize,
    pub anchor_edges: usize,
    /// Commits folded into edge paths
    pub summarized_commits: usize,
}

/// Compact a raw `(parent, child)` edge list with its tracked instances
pub fn compact<P, C>(
    edges: &[(P, C)],
    instances: &[TrackedInstance],
    canvas: &Canvas,
) -> Result<CommitGraph, CompactError>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let dag = Dag::from_edges(edges.iter().map(|(p, c)| (p.as_ref(), c.as_ref())));
    compact_dag(&dag, instances, canvas)
}

/// Compact an already-indexed DAG
pub fn compact_dag(
    dag: &Dag,
    instances: &[TrackedInstance],
    canvas: &Canvas,
) -> Result<CommitGraph, CompactError> {
    let mut graph = CommitGraph::with_anchors(canvas);

    for instance in instances {
        if graph.register(VizNode::Instance(instance.clone())).is_none() {
            warn!(
                commit = %instance.commit,
                name = %instance.name,
                "commit already has an instance node, dropping duplicate"
            );
            continue;
        }
        if !dag.contains(&instance.commit) {
            debug!(commit = %instance.commit, "instance commit not in graph, left isolated");
        }
    }

    let mut node_points = vec![None; dag.vertex_count()];
    for (idx, vertex) in dag.vertices() {
        node_points[idx] = match graph.node_for(&vertex.id) {
            Some(id) => Some(id),
            None if vertex.is_branch_or_merge() => graph.register(VizNode::commit(&vertex.id)),
            None => None,
        };
    }

    graph.edges = Traversal::new(dag, &node_points, graph.anchors).run()?;

    debug!(
        vertices = dag.vertex_count(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "compacted commit graph"
    );

    Ok(graph)
}
