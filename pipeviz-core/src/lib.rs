pub mod config;
pub mod document;
pub mod entity;
pub mod error;

pub use config::RenderConfig;
pub use document::{load_commit_document, load_entity_document, CommitDocument};
pub use entity::{normalize, EntityGraph, EntityId, EntityKind, EntityLink, LinkKind};
pub use error::{ConfigError, DocumentError};
