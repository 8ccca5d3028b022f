//! Definition loader for reading entity definitions from disk
//!
//! Layout:
//! - One JSON file per entity in the definitions directory
//! - Files are loaded in file-name order; non-JSON files are skipped
//! - A missing directory yields no definitions
//!
//! File format:
//!
//! ```json
//! {
//!   "name": "User",
//!   "description": "A registered user",
//!   "fields": [
//!     {"name": "email", "type": "string", "required": true, "pattern": "[^@]+@[^@]+"},
//!     {"name": "role", "type": "string", "choices": ["admin", "member"], "default": "member"},
//!     {"name": "address", "type": "embedded", "entity": "Address"},
//!     {"name": "tags", "type": "list", "items": {"type": "string"}}
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};

use super::def::EntityDef;
use super::errors::{EntityError, EntityResult};
use super::field::{Field, FieldKind};
use super::registry::EntityRegistry;
use crate::value::Value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FieldSpec {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    nullable: bool,
    #[serde(default)]
    naive_ok: bool,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    choices: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    default: Option<serde_json::Value>,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    items: Option<Box<ItemSpec>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemSpec {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    items: Option<Box<ItemSpec>>,
}

/// Loads entity definition files into a registry.
pub struct DefinitionLoader {
    /// Directory containing definition files
    dir: PathBuf,
    allow_unknown: bool,
}

impl DefinitionLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            allow_unknown: false,
        }
    }

    /// Whether loaded entities keep undeclared keys
    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads every definition into a new registry.
    pub fn load(&self) -> EntityResult<EntityRegistry> {
        let registry = EntityRegistry::new();
        self.load_into(&registry)?;
        Ok(registry)
    }

    /// Loads every definition into `registry`, then checks that all embedded
    /// references resolve. Returns the number of definitions loaded.
    pub fn load_into(&self, registry: &EntityRegistry) -> EntityResult<usize> {
        let loaded = self
            .definition_files()?
            .into_iter()
            .map(|path| self.load_file(&path, registry).map(|def| (path, def)))
            .collect::<EntityResult<Vec<_>>>()?;

        for (path, def) in &loaded {
            registry
                .check_definition(def)
                .map_err(|e| EntityError::invalid_definition(path.display().to_string(), e))?;
        }

        info!(
            count = loaded.len(),
            dir = %self.dir.display(),
            "Loaded entity definitions"
        );
        Ok(loaded.len())
    }

    fn definition_files(&self) -> EntityResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            debug!(dir = %self.dir.display(), "Definitions directory missing");
            return Ok(Vec::new());
        }

        let dir_error =
            |e: std::io::Error| EntityError::invalid_definition(self.dir.display().to_string(), e);

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(dir_error)? {
            let path = entry.map_err(dir_error)?.path();

            // Skip non-JSON files
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    /// Loads a single definition file.
    fn load_file(&self, path: &Path, registry: &EntityRegistry) -> EntityResult<Arc<EntityDef>> {
        let location = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            EntityError::invalid_definition(&location, format!("Failed to read file: {}", e))
        })?;

        let file: DefinitionFile = serde_json::from_str(&content).map_err(|e| {
            EntityError::invalid_definition(&location, format!("Invalid JSON: {}", e))
        })?;

        let mut builder = registry
            .define(file.name.clone())
            .allow_unknown_fields(self.allow_unknown);
        if let Some(description) = file.description {
            builder = builder.description(description);
        }
        for spec in file.fields {
            let field = build_field(spec).map_err(|reason| {
                EntityError::invalid_definition(&location, reason)
            })?;
            builder = builder.field(field);
        }

        let def = builder
            .build()
            .map_err(|e| EntityError::invalid_definition(&location, e))?;
        debug!(entity = def.name(), path = %location, "Loaded entity definition");
        Ok(def)
    }
}

fn build_field(spec: FieldSpec) -> Result<Field, String> {
    let kind = parse_kind(&spec.name, &spec.kind, spec.entity, spec.items)?;
    let mut field = Field::new(spec.name, kind);

    if spec.required {
        field = field.required();
    }
    if spec.nullable {
        field = field.nullable();
    }
    if spec.naive_ok {
        field = field.naive_ok();
    }
    if let Some(pattern) = spec.pattern {
        field = field.pattern(&pattern).map_err(|e| e.to_string())?;
    }
    if let Some(choices) = spec.choices {
        field = field.choices(choices.iter().map(Value::from));
    }
    if let Some(default) = spec.default {
        field = field.default(Value::from(default));
    }
    Ok(field)
}

fn parse_kind(
    field: &str,
    kind: &str,
    entity: Option<String>,
    items: Option<Box<ItemSpec>>,
) -> Result<FieldKind, String> {
    let kind = match kind {
        "any" | "anything" => FieldKind::Any,
        "string" => FieldKind::String,
        "integer" => FieldKind::Integer,
        "float" | "number" => FieldKind::Float,
        "boolean" => FieldKind::Boolean,
        "date" => FieldKind::Date,
        "time" => FieldKind::Time,
        "datetime" => FieldKind::DateTime,
        "embedded" => {
            let entity = entity
                .ok_or_else(|| format!("field '{}': embedded type requires 'entity'", field))?;
            FieldKind::Embedded(entity.into())
        }
        "list" => {
            let items =
                items.ok_or_else(|| format!("field '{}': list type requires 'items'", field))?;
            let item = parse_kind(field, &items.kind, items.entity, items.items)?;
            FieldKind::List(Box::new(item))
        }
        other => return Err(format!("field '{}': unknown type '{}'", field, other)),
    };
    Ok(kind)
}
