//! Input documents for both views.
//!
//! Each load is a single awaited read with no retry. Callers skip rendering
//! when it fails.

use crate::entity::ContainerSpec;
use crate::error::DocumentError;
use graph::{compact_dag, Canvas, CommitGraph, CompactError, Dag, TrackedInstance};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commit-graph view input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitDocument {
    /// `[parent, child]` pairs
    #[serde(default)]
    pub cgraph: Vec<(String, String)>,
    #[serde(default)]
    pub instances: Vec<TrackedInstance>,
}

impl CommitDocument {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn dag(&self) -> Dag {
        Dag::from_edges(self.cgraph.iter().map(|(p, c)| (p.as_str(), c.as_str())))
    }

    pub fn compact(&self, canvas: &Canvas) -> Result<CommitGraph, CompactError> {
        compact_dag(&self.dag(), &self.instances, canvas)
    }
}

pub async fn load_commit_document(path: impl AsRef<Path>) -> Result<CommitDocument, DocumentError> {
    load(path.as_ref()).await
}

/// Entity-view input: an array of containers
pub async fn load_entity_document(path: impl AsRef<Path>) -> Result<Vec<ContainerSpec>, DocumentError> {
    load(path.as_ref()).await
}

async fn load<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let document = serde_json::from_slice(&bytes).map_err(|source| DocumentError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded document");
    Ok(document)
}
