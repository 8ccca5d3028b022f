//! Named validator specs
//!
//! `"string"`, `"?integer"`, `"[date]"`, `"?[?string]"` and so on.

use std::sync::Arc;

use super::combinators::{ListOf, Nullable};
use super::errors::{ValidationError, ValidationResult};
use super::types::{
    Anything, BooleanType, DateTimeType, DateType, FloatType, IntegerType, StringType, TimeType,
};
use super::SharedValidator;

/// Builds a validator from its spec string.
///
/// Temporal validators built this way reject naive values.
pub fn parse(spec: &str) -> ValidationResult<SharedValidator> {
    let trimmed = spec.trim();

    if let Some(inner) = trimmed.strip_prefix('?') {
        return Ok(Arc::new(Nullable::new(parse(inner)?)));
    }

    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return Ok(Arc::new(ListOf::new(parse(inner)?)));
    }

    let validator: SharedValidator = match trimmed {
        "anything" | "any" => Arc::new(Anything),
        "string" => Arc::new(StringType),
        "integer" => Arc::new(IntegerType),
        "float" | "number" => Arc::new(FloatType),
        "boolean" => Arc::new(BooleanType),
        "date" => Arc::new(DateType),
        "time" => Arc::new(TimeType::new(false)),
        "datetime" => Arc::new(DateTimeType::new(false)),
        _ => return Err(ValidationError::unknown_validator(spec)),
    };
    Ok(validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::errors::ValidationErrorCode;
    use crate::value::Value;

    #[test]
    fn test_parse_names() {
        for name in ["anything", "string", "integer", "float", "boolean", "date", "time", "datetime"] {
            assert_eq!(parse(name).unwrap().name(), name);
        }
        assert_eq!(parse("number").unwrap().name(), "float");
    }

    #[test]
    fn test_parse_nullable_and_lists() {
        assert_eq!(parse("?string").unwrap().name(), "?string");
        assert_eq!(parse("[integer]").unwrap().name(), "[integer]");
        assert_eq!(parse("?[?date]").unwrap().name(), "?[?date]");

        let v = parse("[?integer]").unwrap();
        let input = Value::List(vec![Value::Int(1), Value::Null].into());
        assert!(v.validate(input, "xs").is_ok());
    }

    #[test]
    fn test_parse_unknown() {
        let err = parse("strnig").unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::UnknownValidator);

        assert!(parse("[string").is_err());
        assert!(parse("").is_err());
    }
}
