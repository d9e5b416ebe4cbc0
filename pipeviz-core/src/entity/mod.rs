//! Entity-relationship view of deployment infrastructure.
//!
//! Containers, logic states, processes, data spaces and data sets are
//! flattened into one typed node list, with containment and cross-reference
//! links between them.

pub mod spec;
mod normalize;

pub use normalize::normalize;
pub use spec::{
    ContainerSpec, DataLinkSpec, DataSetSpec, DataSpaceSpec, Genesis, ListenKind, ListenSpec,
    Loc, LogicStateSpec, ProcessSpec,
};

use graph::render::DotWriter;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Container,
    Logic,
    Process,
    DataSpace,
    DataSet,
}

impl EntityKind {
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::Container => "container",
            EntityKind::Logic => "logic",
            EntityKind::Process => "process",
            EntityKind::DataSpace => "dataspace",
            EntityKind::DataSet => "dataset",
        }
    }

    pub fn radius(self) -> f64 {
        match self {
            EntityKind::Container => 45.0,
            EntityKind::Process => 37.0,
            EntityKind::Logic | EntityKind::DataSpace | EntityKind::DataSet => 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    pub kind: EntityKind,
    pub name: String,
    /// Hostname of the owning container
    pub host: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// Container to anything it holds
    Contains,
    /// Logic state to the process serving a dataset it uses
    DataUsage,
    /// Process to a logic state it runs
    Runs,
    /// Process to a data space it manages
    Manages,
    /// Data space to one of its data sets
    Holds,
    /// Data set to the data set it was derived from
    Genesis,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityLink {
    pub source: EntityId,
    pub target: EntityId,
    pub kind: LinkKind,
    /// Dataset name for data-usage links
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityGraph {
    nodes: Vec<EntityNode>,
    links: Vec<EntityLink>,
    /// Hostname -> container node
    containers: HashMap<String, EntityId>,
}

impl EntityGraph {
    fn push_node(&mut self, kind: EntityKind, name: impl Into<String>, host: &str) -> EntityId {
        let id = EntityId(self.nodes.len());
        self.nodes.push(EntityNode {
            kind,
            name: name.into(),
            host: host.to_string(),
        });
        id
    }

    fn push_link(&mut self, source: EntityId, target: EntityId, kind: LinkKind, name: Option<String>) {
        self.links.push(EntityLink {
            source,
            target,
            kind,
            name,
        });
    }

    pub fn nodes(&self) -> &[EntityNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[EntityLink] {
        &self.links
    }

    pub fn node(&self, id: EntityId) -> &EntityNode {
        &self.nodes[id.0]
    }

    pub fn container(&self, hostname: &str) -> Option<EntityId> {
        self.containers.get(hostname).copied()
    }

    /// First node of `kind` named `name` on `host`
    pub fn find(&self, host: &str, kind: EntityKind, name: &str) -> Option<EntityId> {
        self.nodes
            .iter()
            .position(|n| n.kind == kind && n.host == host && n.name == name)
            .map(EntityId)
    }

    pub fn links_of(&self, kind: LinkKind) -> impl Iterator<Item = &EntityLink> {
        self.links.iter().filter(move |l| l.kind == kind)
    }

    /// Links out of containers pull harder than the rest
    pub fn link_strength(&self, link: &EntityLink) -> f64 {
        if self.node(link.source).kind == EntityKind::Container {
            1.0
        } else {
            0.5
        }
    }

    pub fn view(&self) -> EntityView<'_> {
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| EntityNodeView {
                id,
                name: &node.name,
                kind: node.kind.tag(),
                host: &node.host,
                radius: node.kind.radius(),
            })
            .collect();

        let links = self
            .links
            .iter()
            .map(|link| EntityLinkView {
                source: link.source.0,
                target: link.target.0,
                kind: link.kind,
                name: link.name.as_deref(),
                strength: self.link_strength(link),
            })
            .collect();

        EntityView { nodes, links }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.view())
    }

    pub fn to_dot(&self) -> String {
        let mut dot = DotWriter::new("entities");

        for (id, node) in self.nodes.iter().enumerate() {
            dot.node(
                id,
                &[
                    ("label", node.name.clone()),
                    ("class", node.kind.tag().to_string()),
                ],
            );
        }

        for link in &self.links {
            let mut attrs = Vec::new();
            if let Some(name) = &link.name {
                attrs.push(("label", name.clone()));
            }
            if link.kind == LinkKind::Genesis {
                attrs.push(("style", "dashed".to_string()));
            }
            dot.edge(link.source.0, link.target.0, &attrs);
        }

        dot.finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityNodeView<'a> {
    pub id: usize,
    pub name: &'a str,
    pub kind: &'static str,
    pub host: &'a str,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityLinkView<'a> {
    pub source: usize,
    pub target: usize,
    pub kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntityView<'a> {
    pub nodes: Vec<EntityNodeView<'a>>,
    pub links: Vec<EntityLinkView<'a>>,
}
