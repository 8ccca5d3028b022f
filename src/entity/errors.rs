//! # Entity Errors
//!
//! Error types for entity definitions, instances and the registry.

use thiserror::Error;

use crate::validator::ValidationError;

/// Result type for entity operations
pub type EntityResult<T> = Result<T, EntityError>;

/// Entity errors
#[derive(Debug, Clone, Error)]
pub enum EntityError {
    // ==================
    // Instance Errors
    // ==================
    /// Data failed validation; nothing was constructed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // ==================
    // Definition Errors
    // ==================
    /// Entity name registered twice
    #[error("Entity already registered: {0}")]
    DuplicateEntity(String),

    /// Field key declared twice in one definition
    #[error("Field '{field}' declared twice in entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// Field pattern is not a valid regex
    #[error("Invalid pattern for field '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },

    /// No entity registered under this name
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// Definition file could not be read or understood
    #[error("Invalid definition {path}: {reason}")]
    InvalidDefinition { path: String, reason: String },

    // ==================
    // Internal Errors
    // ==================
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EntityError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            EntityError::Validation(err) => err.code().code(),
            EntityError::DuplicateEntity(_) => "NONOBVIOUS_DUPLICATE_ENTITY",
            EntityError::DuplicateField { .. } => "NONOBVIOUS_DUPLICATE_FIELD",
            EntityError::InvalidPattern { .. } => "NONOBVIOUS_INVALID_PATTERN",
            EntityError::UnknownEntity(_) => "NONOBVIOUS_UNKNOWN_ENTITY",
            EntityError::InvalidDefinition { .. } => "NONOBVIOUS_INVALID_DEFINITION",
            EntityError::Internal(_) => "NONOBVIOUS_INTERNAL",
        }
    }

    /// The validation error, when this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            EntityError::Validation(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn invalid_definition(path: impl Into<String>, reason: impl ToString) -> Self {
        EntityError::InvalidDefinition {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
