use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompactError {
    /// The walk reached a commit that is still on its own active path
    #[error("commit graph contains a cycle through {commit}")]
    Cycle { commit: String },
}
