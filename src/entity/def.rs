//! Entity definitions
//!
//! An `EntityDef` is the schema of an entity: an ordered list of fields
//! compiled into a single object validator. Definitions are immutable once
//! built and shared through `Arc`.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::errors::{EntityError, EntityResult};
use super::field::Field;
use super::instance::Entity;
use super::registry::{EntityRegistry, RegistrySlot, WeakRegistry};
use crate::frozen::FrozenMap;
use crate::validator::{make_path, Object, ObjectField, ValidationError, ValidationResult, ROOT_PATH};
use crate::value::Value;

/// Schema of an entity
pub struct EntityDef {
    name: String,
    description: Option<String>,
    fields: Vec<Field>,
    defaults: FrozenMap<String, Value>,
    validator: Object,
    registry: RegistrySlot,
}

impl EntityDef {
    /// Starts a definition that is not bound to any registry.
    ///
    /// Embedded fields of such a definition can only refer to other
    /// definitions directly, unless it is later registered.
    pub fn builder(name: impl Into<String>) -> EntityDefBuilder {
        EntityDefBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Validated default for `key`, if the field declares one
    pub fn default_for(&self, key: &str) -> Option<&Value> {
        self.defaults.get(key)
    }

    /// Maps each field key (prefixed with `+` when required) to its type name
    pub fn validation_spec(&self) -> FrozenMap<String, String> {
        self.fields.iter().map(Field::validation_spec).collect()
    }

    /// The registry this definition belongs to, if it is still alive
    pub fn registry(&self) -> Option<EntityRegistry> {
        self.registry.get().and_then(WeakRegistry::upgrade)
    }

    /// Creates an instance from `data`.
    ///
    /// Absent keys take their field defaults, then the whole map is validated.
    /// Either every field validates and an entity is returned, or nothing is
    /// constructed.
    pub fn create(self: &Arc<Self>, data: FrozenMap<String, Value>) -> EntityResult<Entity> {
        Ok(self.instantiate(&data, ROOT_PATH)?)
    }

    /// Creates an instance from primitive JSON data.
    pub fn create_from_json(self: &Arc<Self>, json: &serde_json::Value) -> EntityResult<Entity> {
        match Value::from(json) {
            Value::Map(data) => self.create(data),
            other => Err(ValidationError::type_mismatch(ROOT_PATH, "object", other.type_name()).into()),
        }
    }

    pub(crate) fn instantiate(
        self: &Arc<Self>,
        data: &FrozenMap<String, Value>,
        path: &str,
    ) -> ValidationResult<Entity> {
        let merged = self.defaults.merged(data);
        let validated = self.validator.validate_map(&merged, path)?;
        Ok(Entity::new(Arc::clone(self), validated))
    }

    /// Attaches the definition to a registry; the first registry wins.
    /// Validates the defaults `build` skipped because their fields embed
    /// entities by name. The targets must be registered by now.
    pub(crate) fn check_deferred_defaults(&self) -> ValidationResult<()> {
        for (field, compiled) in self.fields.iter().zip(self.validator.fields()) {
            if field.kind().named_refs().is_empty() {
                continue;
            }
            if let Some(default) = field.default_value() {
                compiled
                    .validator
                    .validate(default.clone(), &make_path(&self.name, field.key()))?;
            }
        }
        Ok(())
    }

    pub(crate) fn bind(&self, registry: WeakRegistry) {
        let _ = self.registry.set(registry);
    }
}

impl fmt::Debug for EntityDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDef")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for `EntityDef`
#[derive(Debug)]
pub struct EntityDefBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<Field>,
    allow_unknown: bool,
    registry: Option<EntityRegistry>,
}

impl EntityDefBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            allow_unknown: false,
            registry: None,
        }
    }

    pub(crate) fn registry(mut self, registry: EntityRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Keep undeclared keys instead of rejecting them
    pub fn allow_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown = allow;
        self
    }

    /// Adds a field. Keys must be unique; `build` reports duplicates.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Compiles the definition and, when started from a registry, registers it.
    pub fn build(self) -> EntityResult<Arc<EntityDef>> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key()) {
                return Err(EntityError::DuplicateField {
                    entity: self.name.clone(),
                    field: field.key().to_string(),
                });
            }
        }

        let slot: RegistrySlot = Arc::new(OnceLock::new());
        if let Some(registry) = &self.registry {
            let _ = slot.set(registry.downgrade());
        }

        let mut object_fields = Vec::with_capacity(self.fields.len());
        let mut defaults = FrozenMap::new();
        for field in &self.fields {
            let validator = field.compile(&self.name, &slot)?;

            // Named targets may not be registered yet; those defaults wait
            // for `check_deferred_defaults`.
            if let Some(default) = field.default_value() {
                let value = if field.kind().named_refs().is_empty() {
                    validator.validate(default.clone(), &make_path(&self.name, field.key()))?
                } else {
                    default.clone()
                };
                defaults = defaults.with(field.key().to_string(), value);
            }

            object_fields.push(ObjectField {
                key: field.key().to_string(),
                required: field.is_required(),
                validator,
            });
        }

        let def = Arc::new(EntityDef {
            name: self.name,
            description: self.description,
            fields: self.fields,
            defaults,
            validator: Object::new(object_fields).allow_unknown(self.allow_unknown),
            registry: slot,
        });

        if let Some(registry) = self.registry {
            registry.register(Arc::clone(&def))?;
        }
        Ok(def)
    }
}
