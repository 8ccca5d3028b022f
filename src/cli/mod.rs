//! CLI module for nonobvious
//!
//! Provides command-line interface for:
//! - check: Load entity definitions and list them
//! - spec: Print an entity's validation spec
//! - validate: Validate JSON lines from stdin against an entity

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, run, run_command, spec, validate, validate_lines, ValidateSummary};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response};
