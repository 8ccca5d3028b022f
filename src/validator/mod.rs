//! Value validation
//!
//! A validator takes a `Value` and either returns the adapted value or a
//! `ValidationError` naming the failing field path. Validators never mutate
//! their input; adaptation always produces a new value.
//!
//! Paths:
//! - `$root` for the top-level value
//! - `a.b` for nested keys
//! - `a[1]` for list elements

mod combinators;
mod errors;
mod object;
mod parse;
mod types;

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

pub use combinators::{AllOf, Check, Choices, ListOf, Nullable, Pattern, Predicate};
pub use errors::{ValidationDetails, ValidationError, ValidationErrorCode, ValidationResult};
pub use object::{make_path, Object, ObjectField, ROOT_PATH};
pub use parse::parse;
pub use types::{
    Anything, BooleanType, DateTimeType, DateType, FloatType, IntegerType, StringType, TimeType,
};

/// Validates and adapts values
pub trait Validator: Send + Sync + fmt::Debug {
    /// Type name shown in validation specs and error messages
    fn name(&self) -> String;

    /// Validates `value` found at `path`, returning the adapted value.
    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value>;

    /// Validates a top-level value.
    fn check(&self, value: Value) -> ValidationResult<Value> {
        self.validate(value, ROOT_PATH)
    }
}

/// A validator shared between fields and definitions
pub type SharedValidator = Arc<dyn Validator>;
