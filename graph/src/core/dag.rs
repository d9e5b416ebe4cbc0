use smallvec::SmallVec;
use std::collections::HashMap;

/// Index of a vertex inside a [`Dag`]
pub type VertexIdx = usize;

/// A single commit vertex with its adjacency
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Commit ID
    pub id: String,
    /// Children, in first-seen order
    pub successors: SmallVec<[VertexIdx; 2]>,
    /// Parents, in first-seen order
    pub predecessors: SmallVec<[VertexIdx; 2]>,
}

impl Vertex {
    fn new(id: String) -> Self {
        Self {
            id,
            successors: SmallVec::new(),
            predecessors: SmallVec::new(),
        }
    }

    /// No parents
    pub fn is_source(&self) -> bool {
        self.predecessors.is_empty()
    }

    /// No children
    pub fn is_sink(&self) -> bool {
        self.successors.is_empty()
    }

    /// More than one parent or more than one child
    pub fn is_branch_or_merge(&self) -> bool {
        self.predecessors.len() > 1 || self.successors.len() > 1
    }
}

/// Directed Acyclic Graph over commit IDs, built from (parent, child) pairs.
///
/// Acyclicity is assumed here and only checked during compaction.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    /// Vertices in first-seen order
    vertices: Vec<Vertex>,
    /// Quick lookup: commit ID -> vertex index
    index: HashMap<String, VertexIdx>,
    edge_count: usize,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a DAG from a raw `(parent, child)` edge list
    pub fn from_edges<I, P, C>(edges: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        let mut dag = Self::new();
        for (parent, child) in edges {
            dag.add_edge(parent.as_ref(), child.as_ref());
        }
        dag
    }

    /// Add a vertex if missing, returning its index
    pub fn add_vertex(&mut self, commit_id: &str) -> VertexIdx {
        if let Some(&idx) = self.index.get(commit_id) {
            return idx;
        }

        let idx = self.vertices.len();
        self.vertices.push(Vertex::new(commit_id.to_string()));
        self.index.insert(commit_id.to_string(), idx);
        idx
    }

    /// Add a parent -> child edge. Returns false if the edge already existed.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> bool {
        let p = self.add_vertex(parent);
        let c = self.add_vertex(child);

        if self.vertices[p].successors.contains(&c) {
            return false;
        }

        self.vertices[p].successors.push(c);
        self.vertices[c].predecessors.push(p);
        self.edge_count += 1;
        true
    }

    /// Look up a vertex index by commit ID
    pub fn index_of(&self, commit_id: &str) -> Option<VertexIdx> {
        self.index.get(commit_id).copied()
    }

    pub fn contains(&self, commit_id: &str) -> bool {
        self.index.contains_key(commit_id)
    }

    pub fn vertex(&self, idx: VertexIdx) -> &Vertex {
        &self.vertices[idx]
    }

    /// Commit ID of a vertex
    pub fn id(&self, idx: VertexIdx) -> &str {
        &self.vertices[idx].id
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexIdx, &Vertex)> {
        self.vertices.iter().enumerate()
    }

    pub fn successors(&self, idx: VertexIdx) -> &[VertexIdx] {
        &self.vertices[idx].successors
    }

    pub fn predecessors(&self, idx: VertexIdx) -> &[VertexIdx] {
        &self.vertices[idx].predecessors
    }

    pub fn successor_count(&self, idx: VertexIdx) -> usize {
        self.vertices[idx].successors.len()
    }

    pub fn predecessor_count(&self, idx: VertexIdx) -> usize {
        self.vertices[idx].predecessors.len()
    }

    /// Vertices with no predecessors, in first-seen order
    pub fn sources(&self) -> Vec<VertexIdx> {
        self.vertices()
            .filter(|(_, v)| v.is_source())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Vertices with no successors, in first-seen order
    pub fn sinks(&self) -> Vec<VertexIdx> {
        self.vertices()
            .filter(|(_, v)| v.is_sink())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Count of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Count of distinct edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Get statistics about the DAG
    pub fn stats(&self) -> DagStats {
        let merge_commits = self
            .vertices
            .iter()
            .filter(|v| v.predecessors.len() > 1)
            .count();
        let branch_points = self
            .vertices
            .iter()
            .filter(|v| v.successors.len() > 1)
            .count();
        let root_commits = self.vertices.iter().filter(|v| v.is_source()).count();
        let leaf_commits = self.vertices.iter().filter(|v| v.is_sink()).count();

        DagStats {
            total_commits: self.vertices.len(),
            total_edges: self.edge_count,
            merge_commits,
            branch_points,
            root_commits,
            leaf_commits,
            has_orphans: root_commits > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagStats {
    pub total_commits: usize,
    pub total_edges: usize,
    pub merge_commits: usize,
    pub branch_points: usize,
    pub root_commits: usize,
    pub leaf_commits: usize,
    pub has_orphans: bool,
}
