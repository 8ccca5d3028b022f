//! CLI command implementations
//!
//! Every command follows the same boot sequence:
//! 1. Load configuration (the default path may be absent)
//! 2. Install the log subscriber
//! 3. Load entity definitions from the configured directory
//!
//! Results are written to stdout as JSON lines; logs go to stderr.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::entity::{DefinitionLoader, EntityDef, EntityRegistry};
use crate::observability::init_logger;
use crate::value::Value;

use super::args::{Cli, Command};
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_requests, stdout, write_error, write_response};

/// Outcome of a `validate` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateSummary {
    pub accepted: usize,
    pub rejected: usize,
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a CLI command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Check { config } => check(config.as_deref(), &mut stdout()),
        Command::Spec { config, entity } => spec(config.as_deref(), &entity, &mut stdout()),
        Command::Validate { config, entity } => {
            let stdin = io::stdin();
            validate(config.as_deref(), &entity, stdin.lock(), &mut stdout()).map(|_| ())
        }
    }
}

/// Load every definition and report the entity names
pub fn check<W: Write>(config_path: Option<&Path>, out: &mut W) -> CliResult<()> {
    let registry = boot(config_path)?;
    write_response(out, json!({ "entities": registry.names() }))
}

/// Report the validation spec of one entity
pub fn spec<W: Write>(config_path: Option<&Path>, entity: &str, out: &mut W) -> CliResult<()> {
    let registry = boot(config_path)?;
    let def = lookup(&registry, entity)?;

    let fields: serde_json::Map<String, serde_json::Value> = def
        .validation_spec()
        .iter()
        .map(|(key, spec)| (key.clone(), json!(spec)))
        .collect();

    write_response(
        out,
        json!({
            "entity": def.name(),
            "description": def.description(),
            "fields": fields,
        }),
    )
}

/// Validate each input line against one entity
pub fn validate<R: BufRead, W: Write>(
    config_path: Option<&Path>,
    entity: &str,
    input: R,
    out: &mut W,
) -> CliResult<ValidateSummary> {
    let registry = boot(config_path)?;
    let def = lookup(&registry, entity)?;
    validate_lines(&def, input, out)
}

/// Validate JSON lines from `input`, writing one response line per input line.
///
/// A line that fails to parse or validate produces an error response and
/// does not stop the run; a read or write failure does.
pub fn validate_lines<R: BufRead, W: Write>(
    def: &Arc<EntityDef>,
    input: R,
    out: &mut W,
) -> CliResult<ValidateSummary> {
    let mut summary = ValidateSummary::default();

    for request in read_requests(input) {
        let outcome = match request {
            Ok(json) => def.create_from_json(&json).map_err(|e| (e.code(), e.to_string())),
            Err(e) if e.code() == &CliErrorCode::InvalidJson => {
                Err((e.code_str(), e.message().to_string()))
            }
            Err(e) => return Err(e),
        };

        match outcome {
            Ok(entity) => {
                summary.accepted += 1;
                write_response(out, Value::from(entity).to_json())?;
            }
            Err((code, message)) => {
                summary.rejected += 1;
                debug!(entity = def.name(), code, "rejected input line");
                write_error(out, code, &message)?;
            }
        }
    }

    info!(
        entity = def.name(),
        accepted = summary.accepted,
        rejected = summary.rejected,
        "validation finished"
    );
    Ok(summary)
}

/// Load config, install logging and load definitions
fn boot(config_path: Option<&Path>) -> CliResult<EntityRegistry> {
    let (config, path) = load_config(config_path)?;
    init_logger(&config.log);

    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = config.definitions_path(base);
    debug!(config = %path.display(), definitions = %dir.display(), "booting");

    let registry = DefinitionLoader::new(dir)
        .allow_unknown_fields(config.allow_unknown_fields)
        .load()?;
    Ok(registry)
}

/// An explicit path must exist; the default one may be absent
fn load_config(config_path: Option<&Path>) -> CliResult<(Config, PathBuf)> {
    match config_path {
        Some(path) => Ok((Config::load(path)?, path.to_path_buf())),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            Ok((Config::load_or_default(&path)?, path))
        }
    }
}

fn lookup(registry: &EntityRegistry, entity: &str) -> CliResult<Arc<EntityDef>> {
    registry
        .get(entity)
        .ok_or_else(|| CliError::unknown_entity(entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let defs = temp_dir.path().join("defs");
        fs::create_dir(&defs).unwrap();

        fs::write(
            defs.join("user.json"),
            json!({
                "name": "User",
                "description": "A person with an account",
                "fields": [
                    {"name": "email", "type": "string", "required": true},
                    {"name": "age", "type": "integer", "nullable": true},
                    {"name": "role", "type": "string", "choices": ["admin", "guest"], "default": "guest"}
                ]
            })
            .to_string(),
        )
        .unwrap();

        let config_path = temp_dir.path().join("nonobvious.json");
        fs::write(&config_path, json!({"definitions_dir": "defs"}).to_string()).unwrap();
        (temp_dir, config_path)
    }

    fn lines(out: Vec<u8>) -> Vec<serde_json::Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_check_lists_entities() {
        let (_temp, config_path) = setup();
        let mut out = Vec::new();
        check(Some(&config_path), &mut out).unwrap();

        let response = &lines(out)[0];
        assert_eq!(response["status"], "ok");
        assert_eq!(response["data"]["entities"], json!(["User"]));
    }

    #[test]
    fn test_spec_reports_fields() {
        let (_temp, config_path) = setup();
        let mut out = Vec::new();
        spec(Some(&config_path), "User", &mut out).unwrap();

        let response = &lines(out)[0];
        assert_eq!(response["data"]["entity"], "User");
        assert_eq!(response["data"]["description"], "A person with an account");
        assert_eq!(response["data"]["fields"]["+email"], "string");
    }

    #[test]
    fn test_unknown_entity() {
        let (_temp, config_path) = setup();
        let mut out = Vec::new();
        let err = spec(Some(&config_path), "Nobody", &mut out).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::UnknownEntity);
    }

    #[test]
    fn test_missing_explicit_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        let err = check(Some(&path), &mut Vec::new()).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_validate_per_line() {
        let (_temp, config_path) = setup();
        let input = Cursor::new(
            [
                r#"{"email": "a@example.com", "age": 30}"#,
                r#"{"age": 30}"#,
                "not json",
                "",
                r#"{"email": "b@example.com", "role": "root"}"#,
            ]
            .join("\n"),
        );
        let mut out = Vec::new();
        let summary = validate(Some(&config_path), "User", input, &mut out).unwrap();

        assert_eq!(summary, ValidateSummary { accepted: 1, rejected: 3 });

        let responses = lines(out);
        assert_eq!(responses.len(), 4);

        assert_eq!(responses[0]["status"], "ok");
        assert_eq!(responses[0]["data"]["role"], "guest");

        assert_eq!(responses[1]["status"], "error");
        assert_eq!(responses[1]["code"], "NONOBVIOUS_MISSING_FIELD");

        assert_eq!(responses[2]["code"], "NONOBVIOUS_CLI_INVALID_JSON");
        assert_eq!(responses[3]["code"], "NONOBVIOUS_INVALID_CHOICE");
    }
}
