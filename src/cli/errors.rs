//! CLI errors
//!
//! A `CliError` ends the process: `main` prints it to stderr and exits 1.
//! Lines rejected by `validate` are answered on stdout and never become one.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::entity::EntityError;

/// What went wrong, with a stable code string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    ConfigError,
    IoError,
    /// An input line is not JSON
    InvalidJson,
    /// The definitions directory did not load
    DefinitionError,
    UnknownEntity,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "NONOBVIOUS_CLI_CONFIG_ERROR",
            Self::IoError => "NONOBVIOUS_CLI_IO_ERROR",
            Self::InvalidJson => "NONOBVIOUS_CLI_INVALID_JSON",
            Self::DefinitionError => "NONOBVIOUS_CLI_DEFINITION_ERROR",
            Self::UnknownEntity => "NONOBVIOUS_CLI_UNKNOWN_ENTITY",
        }
    }
}

/// Fatal CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    fn new(code: CliErrorCode, message: impl ToString) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    /// The requested entity is not among the loaded definitions
    pub fn unknown_entity(name: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownEntity,
            format!("No entity named '{}' in the definitions directory", name),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::new(CliErrorCode::IoError, e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(CliErrorCode::InvalidJson, e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e)
    }
}

impl From<EntityError> for CliError {
    fn from(e: EntityError) -> Self {
        Self::new(CliErrorCode::DefinitionError, e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_leads_with_code() {
        let err = CliError::unknown_entity("Ghost");
        assert_eq!(
            err.to_string(),
            "NONOBVIOUS_CLI_UNKNOWN_ENTITY: No entity named 'Ghost' in the definitions directory"
        );
    }

    #[test]
    fn test_config_errors_keep_their_code() {
        let err = CliError::from(ConfigError::Invalid("bus_capacity must be > 0".into()));
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.message().contains("bus_capacity"));
    }
}
