//! Validation of keyed objects against declared fields
//!
//! Validation semantics:
//! - No undeclared keys exist (unless unknown keys are allowed)
//! - All required keys are present
//! - Every present key passes its validator
//!
//! Keys are checked in declaration order and validation stops at the first
//! failure, so the reported error is deterministic.

use super::errors::{ValidationError, ValidationResult};
use super::types::{reject_null, type_error};
use super::{SharedValidator, Validator};
use crate::frozen::FrozenMap;
use crate::value::Value;

/// Path used for errors about the top-level value
pub const ROOT_PATH: &str = "$root";

/// A declared key of an `Object`
#[derive(Debug, Clone)]
pub struct ObjectField {
    pub key: String,
    pub required: bool,
    pub validator: SharedValidator,
}

impl ObjectField {
    pub fn required(key: impl Into<String>, validator: SharedValidator) -> Self {
        Self {
            key: key.into(),
            required: true,
            validator,
        }
    }

    pub fn optional(key: impl Into<String>, validator: SharedValidator) -> Self {
        Self {
            key: key.into(),
            required: false,
            validator,
        }
    }
}

/// Validates maps key by key
#[derive(Debug, Clone)]
pub struct Object {
    fields: Vec<ObjectField>,
    allow_unknown: bool,
}

impl Object {
    pub fn new(fields: Vec<ObjectField>) -> Self {
        Self {
            fields,
            allow_unknown: false,
        }
    }

    /// Keep undeclared keys instead of rejecting them
    pub fn allow_unknown(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    pub fn fields(&self) -> &[ObjectField] {
        &self.fields
    }

    fn is_declared(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key == key)
    }

    /// Validates an already-extracted map.
    pub fn validate_map(
        &self,
        map: &FrozenMap<String, Value>,
        path: &str,
    ) -> ValidationResult<FrozenMap<String, Value>> {
        if !self.allow_unknown {
            if let Some(key) = map.keys().find(|key| !self.is_declared(key)) {
                return Err(ValidationError::unknown_field(make_path(path, key)));
            }
        }

        let mut adapted = if self.allow_unknown {
            map.clone()
        } else {
            FrozenMap::new()
        };

        for field in &self.fields {
            let field_path = make_path(path, &field.key);
            match map.get(field.key.as_str()) {
                Some(value) => {
                    let value = field.validator.validate(value.clone(), &field_path)?;
                    adapted = adapted.with(field.key.clone(), value);
                }
                None if field.required => {
                    return Err(ValidationError::missing_field(field_path));
                }
                None => {}
            }
        }

        Ok(adapted)
    }
}

impl Validator for Object {
    fn name(&self) -> String {
        "object".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        let map = match value {
            Value::Map(map) => map,
            Value::Entity(entity) => entity.data().clone(),
            other => return Err(type_error(path, "object", &other)),
        };
        self.validate_map(&map, path).map(Value::Map)
    }
}

/// Creates a field path from prefix and field name.
pub fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() || prefix == ROOT_PATH {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
