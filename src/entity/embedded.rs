//! Validator for fields holding another entity

use std::sync::Arc;

use super::def::EntityDef;
use super::field::EntityRef;
use super::registry::{RegistrySlot, WeakRegistry};
use crate::validator::{ValidationError, ValidationResult, Validator};
use crate::value::Value;

/// Accepts an entity of the target definition, or a map adapted into one
#[derive(Debug, Clone)]
pub(crate) struct EmbeddedValidator {
    target: EntityRef,
    registry: RegistrySlot,
}

impl EmbeddedValidator {
    pub(crate) fn new(target: EntityRef, registry: RegistrySlot) -> Self {
        Self { target, registry }
    }

    fn resolve(&self, path: &str) -> ValidationResult<Arc<EntityDef>> {
        match &self.target {
            EntityRef::Def(def) => Ok(Arc::clone(def)),
            EntityRef::Named(name) => self
                .registry
                .get()
                .and_then(WeakRegistry::upgrade)
                .and_then(|registry| registry.get(name))
                .ok_or_else(|| ValidationError::unknown_entity(path, name.clone())),
        }
    }
}

impl Validator for EmbeddedValidator {
    fn name(&self) -> String {
        self.target.name().to_string()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        if value.is_null() {
            return Err(ValidationError::null_value(path));
        }
        let def = self.resolve(path)?;

        match value {
            Value::Entity(entity) if entity.name() == def.name() => Ok(Value::Entity(entity)),
            Value::Entity(entity) => Err(ValidationError::type_mismatch(
                path,
                def.name(),
                entity.name(),
            )),
            Value::Map(data) => def.instantiate(&data, path).map(Value::Entity),
            other => Err(ValidationError::type_mismatch(
                path,
                def.name(),
                other.type_name(),
            )),
        }
    }
}
