pub mod core;
pub mod compact;
pub mod error;
pub mod git_backend;
pub mod render;

pub use core::{Dag, DagStats, EdgeClass, NodeId, TrackedInstance, VizEdge, VizNode};
pub use compact::{compact, compact_dag, Canvas, CommitGraph, CompactStats};
pub use error::CompactError;
pub use git_backend::GitWalker;
pub use render::RenderOptions;
