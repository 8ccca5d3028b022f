//! # Node Errors

use thiserror::Error;

use crate::entity::EntityError;

/// Result type for node handlers
pub type NodeResult<T> = Result<T, NodeError>;

/// Node errors
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    /// Message could not be adapted into the node's entity
    #[error("Message rejected: {0}")]
    Rejected(#[from] EntityError),

    /// Handler reported a failure
    #[error("Handler failed: {0}")]
    Handler(String),
}

impl NodeError {
    pub fn handler(message: impl Into<String>) -> Self {
        NodeError::Handler(message.into())
    }
}
