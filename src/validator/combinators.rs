//! Validators that wrap other validators

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::errors::{ValidationDetails, ValidationError, ValidationErrorCode, ValidationResult};
use super::types::{reject_null, type_error};
use super::{SharedValidator, Validator};
use crate::frozen::FrozenList;
use crate::value::Value;

/// Accepts null, otherwise defers to `inner`
#[derive(Debug, Clone)]
pub struct Nullable {
    inner: SharedValidator,
}

impl Nullable {
    pub fn new(inner: SharedValidator) -> Self {
        Self { inner }
    }
}

impl Validator for Nullable {
    fn name(&self) -> String {
        format!("?{}", self.inner.name())
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        self.inner.validate(value, path)
    }
}

/// Accepts a list whose every element passes `inner`
#[derive(Debug, Clone)]
pub struct ListOf {
    inner: SharedValidator,
}

impl ListOf {
    pub fn new(inner: SharedValidator) -> Self {
        Self { inner }
    }
}

impl Validator for ListOf {
    fn name(&self) -> String {
        format!("[{}]", self.inner.name())
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        let items = match value {
            Value::List(items) => items,
            other => return Err(type_error(path, &self.name(), &other)),
        };

        let adapted = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let elem_path = format!("{}[{}]", path, i);
                self.inner.validate(item.clone(), &elem_path)
            })
            .collect::<ValidationResult<FrozenList<Value>>>()?;

        Ok(Value::List(adapted))
    }
}

/// Restricts `inner` to a fixed set of values
#[derive(Debug, Clone)]
pub struct Choices {
    values: FrozenList<Value>,
    inner: SharedValidator,
}

impl Choices {
    pub fn new(values: impl IntoIterator<Item = Value>, inner: SharedValidator) -> Self {
        Self {
            values: values.into_iter().collect(),
            inner,
        }
    }

    pub fn values(&self) -> &FrozenList<Value> {
        &self.values
    }
}

impl Validator for Choices {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        let adapted = self.inner.validate(value, path)?;
        if self.values.iter().any(|choice| *choice == adapted) {
            return Ok(adapted);
        }

        let allowed = self
            .values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ValidationError::field(
            ValidationErrorCode::InvalidChoice,
            ValidationDetails::new(path, format!("one of [{}]", allowed), adapted.to_string()),
        ))
    }
}

/// Requires the whole string produced by `inner` to match a regex
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
    inner: SharedValidator,
}

impl Pattern {
    /// Compiles `pattern` anchored at both ends.
    pub fn new(pattern: &str, inner: SharedValidator) -> Result<Self, regex::Error> {
        let regex = Self::anchored(pattern)?;
        Ok(Self::from_regex(pattern, regex, inner))
    }

    /// Wraps a regex already produced by `anchored`.
    pub fn from_regex(source: impl Into<String>, regex: Regex, inner: SharedValidator) -> Self {
        Self {
            source: source.into(),
            regex,
            inner,
        }
    }

    /// Compiles `pattern` so it must match the whole input.
    pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{})$", pattern))
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }
}

impl Validator for Pattern {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        let adapted = self.inner.validate(value, path)?;
        let text = adapted
            .as_str()
            .ok_or_else(|| type_error(path, "string", &adapted))?;

        if !self.regex.is_match(text) {
            return Err(ValidationError::field(
                ValidationErrorCode::PatternMismatch,
                ValidationDetails::new(
                    path,
                    format!("string matching /{}/", self.source),
                    adapted.to_string(),
                ),
            ));
        }
        Ok(adapted)
    }
}

/// Predicate used by `Check`
pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Runs a custom predicate after `inner` has accepted the value
#[derive(Clone)]
pub struct Check {
    description: String,
    predicate: Predicate,
    inner: SharedValidator,
}

impl Check {
    pub fn new(description: impl Into<String>, predicate: Predicate, inner: SharedValidator) -> Self {
        Self {
            description: description.into(),
            predicate,
            inner,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("description", &self.description)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl Validator for Check {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        let adapted = self.inner.validate(value, path)?;
        if (self.predicate)(&adapted) {
            return Ok(adapted);
        }
        Err(ValidationError::field(
            ValidationErrorCode::CheckFailed,
            ValidationDetails::new(path, self.description.clone(), adapted.to_string()),
        ))
    }
}

/// Runs validators in sequence, feeding each one the previous output
#[derive(Debug, Clone)]
pub struct AllOf {
    validators: Vec<SharedValidator>,
}

impl AllOf {
    pub fn new(validators: Vec<SharedValidator>) -> Self {
        Self { validators }
    }
}

impl Validator for AllOf {
    fn name(&self) -> String {
        self.validators
            .iter()
            .map(|v| v.name())
            .collect::<Vec<_>>()
            .join(" & ")
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        self.validators
            .iter()
            .try_fold(value, |current, validator| validator.validate(current, path))
    }
}
