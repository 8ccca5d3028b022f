//! # Scheduler Errors

use thiserror::Error;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler errors
#[derive(Debug, Clone, Error)]
pub enum SchedulerError {
    /// No scheduled node has this id
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// The scheduler has been stopped
    #[error("Scheduler stopped")]
    Stopped,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
