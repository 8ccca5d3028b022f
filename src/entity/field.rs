//! Declarative field definitions

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::def::EntityDef;
use super::embedded::EmbeddedValidator;
use super::errors::{EntityError, EntityResult};
use super::registry::RegistrySlot;
use crate::frozen::FrozenList;
use crate::validator::{
    Anything, BooleanType, Check, Choices, DateTimeType, DateType, FloatType, IntegerType,
    make_path, ListOf, Nullable, Pattern, Predicate, SharedValidator, StringType, TimeType,
    ValidationResult,
};
use crate::value::Value;

/// Target of an embedded field
#[derive(Clone)]
pub enum EntityRef {
    /// Resolved through the owning definition's registry at validation time
    Named(String),
    Def(Arc<EntityDef>),
}

impl EntityRef {
    pub fn name(&self) -> &str {
        match self {
            EntityRef::Named(name) => name,
            EntityRef::Def(def) => def.name(),
        }
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
            EntityRef::Def(def) => f.debug_tuple("Def").field(&def.name()).finish(),
        }
    }
}

impl From<&str> for EntityRef {
    fn from(name: &str) -> Self {
        EntityRef::Named(name.to_string())
    }
}

impl From<String> for EntityRef {
    fn from(name: String) -> Self {
        EntityRef::Named(name)
    }
}

impl From<Arc<EntityDef>> for EntityRef {
    fn from(def: Arc<EntityDef>) -> Self {
        EntityRef::Def(def)
    }
}

impl From<&Arc<EntityDef>> for EntityRef {
    fn from(def: &Arc<EntityDef>) -> Self {
        EntityRef::Def(Arc::clone(def))
    }
}

/// Value kind of a field
#[derive(Debug, Clone)]
pub enum FieldKind {
    Any,
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Time,
    DateTime,
    Embedded(EntityRef),
    List(Box<FieldKind>),
}

impl FieldKind {
    /// Type name as shown in validation specs
    pub fn type_name(&self) -> String {
        match self {
            FieldKind::Any => "anything".into(),
            FieldKind::String => "string".into(),
            FieldKind::Integer => "integer".into(),
            FieldKind::Float => "float".into(),
            FieldKind::Boolean => "boolean".into(),
            FieldKind::Date => "date".into(),
            FieldKind::Time => "time".into(),
            FieldKind::DateTime => "datetime".into(),
            FieldKind::Embedded(target) => target.name().to_string(),
            FieldKind::List(item) => format!("[{}]", item.type_name()),
        }
    }

    /// Names of entities this kind refers to by name, including list items
    pub fn named_refs(&self) -> Vec<&str> {
        match self {
            FieldKind::Embedded(EntityRef::Named(name)) => vec![name.as_str()],
            FieldKind::List(item) => item.named_refs(),
            _ => Vec::new(),
        }
    }

    fn compile(&self, naive_ok: bool, slot: &RegistrySlot) -> SharedValidator {
        match self {
            FieldKind::Any => Arc::new(Anything),
            FieldKind::String => Arc::new(StringType),
            FieldKind::Integer => Arc::new(IntegerType),
            FieldKind::Float => Arc::new(FloatType),
            FieldKind::Boolean => Arc::new(BooleanType),
            FieldKind::Date => Arc::new(DateType),
            FieldKind::Time => Arc::new(TimeType::new(naive_ok)),
            FieldKind::DateTime => Arc::new(DateTimeType::new(naive_ok)),
            FieldKind::Embedded(target) => {
                Arc::new(EmbeddedValidator::new(target.clone(), Arc::clone(slot)))
            }
            FieldKind::List(item) => Arc::new(ListOf::new(item.compile(naive_ok, slot))),
        }
    }
}

#[derive(Clone)]
struct FieldCheck {
    description: String,
    predicate: Predicate,
}

#[derive(Clone)]
struct FieldPattern {
    source: String,
    regex: Regex,
}

/// A named, typed field of an entity definition.
///
/// ```ignore
/// let email = Field::string("email").required().pattern(r"[^@]+@[^@]+")?;
/// let tags = Field::list("tags", FieldKind::String).default(Value::List(FrozenList::new()));
/// ```
#[derive(Clone)]
pub struct Field {
    key: String,
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
    choices: Option<FrozenList<Value>>,
    naive_ok: bool,
    nullable: bool,
    pattern: Option<FieldPattern>,
    check: Option<FieldCheck>,
}

impl Field {
    pub fn new(key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            kind,
            required: false,
            default: None,
            choices: None,
            naive_ok: false,
            nullable: false,
            pattern: None,
            check: None,
        }
    }

    pub fn any(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Any)
    }

    pub fn string(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::String)
    }

    pub fn integer(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Integer)
    }

    pub fn float(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Float)
    }

    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Boolean)
    }

    pub fn date(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Date)
    }

    pub fn time(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::Time)
    }

    pub fn datetime(key: impl Into<String>) -> Self {
        Self::new(key, FieldKind::DateTime)
    }

    pub fn embedded(key: impl Into<String>, target: impl Into<EntityRef>) -> Self {
        Self::new(key, FieldKind::Embedded(target.into()))
    }

    pub fn list(key: impl Into<String>, item: FieldKind) -> Self {
        Self::new(key, FieldKind::List(Box::new(item)))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Value used when the key is absent from input data.
    ///
    /// Defaults pass through the field's validator when the definition is built.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn choices<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Accept times and datetimes without a UTC offset
    pub fn naive_ok(mut self) -> Self {
        self.naive_ok = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Require string values to match `pattern` in full.
    pub fn pattern(mut self, pattern: &str) -> EntityResult<Self> {
        let regex = Pattern::anchored(pattern).map_err(|e| EntityError::InvalidPattern {
            field: self.key.clone(),
            reason: e.to_string(),
        })?;
        self.pattern = Some(FieldPattern {
            source: pattern.to_string(),
            regex,
        });
        Ok(self)
    }

    /// Run `predicate` after the type check; `description` names the
    /// expected condition in errors.
    pub fn check<F>(mut self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.check = Some(FieldCheck {
            description: description.into(),
            predicate: Arc::new(predicate),
        });
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn choice_values(&self) -> Option<&FrozenList<Value>> {
        self.choices.as_ref()
    }

    pub fn pattern_source(&self) -> Option<&str> {
        self.pattern.as_ref().map(|p| p.source.as_str())
    }

    /// `("+key", type)` for required fields, `("key", type)` otherwise
    pub fn validation_spec(&self) -> (String, String) {
        let key = if self.required {
            format!("+{}", self.key)
        } else {
            self.key.clone()
        };
        (key, self.kind.type_name())
    }

    /// Builds the validator for this field of `entity`.
    ///
    /// The kind check always runs first; pattern, choices and the custom
    /// check only ever see values the kind accepted. Choices are adapted by
    /// the kind once here, so `1` is a valid choice for a float field.
    pub(crate) fn compile(&self, entity: &str, slot: &RegistrySlot) -> EntityResult<SharedValidator> {
        let path = make_path(entity, &self.key);
        let mut validator = self.kind.compile(self.naive_ok, slot);

        if let Some(pattern) = &self.pattern {
            if !matches!(self.kind, FieldKind::String) {
                return Err(EntityError::invalid_definition(
                    path,
                    format!("pattern needs a string field, not {}", self.kind.type_name()),
                ));
            }
            validator = Arc::new(Pattern::from_regex(
                pattern.source.clone(),
                pattern.regex.clone(),
                validator,
            ));
        }
        if let Some(choices) = &self.choices {
            // Named targets may not be registered yet
            let adapted = if self.kind.named_refs().is_empty() {
                choices
                    .iter()
                    .map(|choice| match choice {
                        Value::Null if self.nullable => Ok(Value::Null),
                        _ => validator.validate(choice.clone(), &path),
                    })
                    .collect::<ValidationResult<Vec<_>>>()
                    .map_err(|e| EntityError::invalid_definition(&path, format!("bad choice: {}", e)))?
            } else {
                choices.to_vec()
            };
            validator = Arc::new(Choices::new(adapted, validator));
        }
        if let Some(check) = &self.check {
            validator = Arc::new(Check::new(
                check.description.clone(),
                Arc::clone(&check.predicate),
                validator,
            ));
        }
        if self.nullable {
            validator = Arc::new(Nullable::new(validator));
        }
        Ok(validator)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("nullable", &self.nullable)
            .field("naive_ok", &self.naive_ok)
            .field("pattern", &self.pattern_source())
            .field("check", &self.check.as_ref().map(|c| c.description.as_str()))
            .finish()
    }
}
