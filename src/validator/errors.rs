//! Validation error types
//!
//! Error codes:
//! - NONOBVIOUS_MISSING_FIELD
//! - NONOBVIOUS_UNKNOWN_FIELD
//! - NONOBVIOUS_TYPE_MISMATCH
//! - NONOBVIOUS_NULL_VALUE
//! - NONOBVIOUS_INVALID_CHOICE
//! - NONOBVIOUS_PATTERN_MISMATCH
//! - NONOBVIOUS_NAIVE_TEMPORAL
//! - NONOBVIOUS_CHECK_FAILED
//! - NONOBVIOUS_UNKNOWN_VALIDATOR
//! - NONOBVIOUS_UNKNOWN_ENTITY

use std::fmt;

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// Required field absent
    MissingField,
    /// Field not declared by the schema
    UnknownField,
    /// Value has the wrong type and cannot be adapted
    TypeMismatch,
    /// Null where a value is required
    NullValue,
    /// Value not among the allowed choices
    InvalidChoice,
    /// String does not match the field pattern
    PatternMismatch,
    /// Time or datetime without a UTC offset
    NaiveTemporal,
    /// Custom check returned false
    CheckFailed,
    /// Validator spec names no known validator
    UnknownValidator,
    /// Embedded entity reference cannot be resolved
    UnknownEntity,
}

impl ValidationErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationErrorCode::MissingField => "NONOBVIOUS_MISSING_FIELD",
            ValidationErrorCode::UnknownField => "NONOBVIOUS_UNKNOWN_FIELD",
            ValidationErrorCode::TypeMismatch => "NONOBVIOUS_TYPE_MISMATCH",
            ValidationErrorCode::NullValue => "NONOBVIOUS_NULL_VALUE",
            ValidationErrorCode::InvalidChoice => "NONOBVIOUS_INVALID_CHOICE",
            ValidationErrorCode::PatternMismatch => "NONOBVIOUS_PATTERN_MISMATCH",
            ValidationErrorCode::NaiveTemporal => "NONOBVIOUS_NAIVE_TEMPORAL",
            ValidationErrorCode::CheckFailed => "NONOBVIOUS_CHECK_FAILED",
            ValidationErrorCode::UnknownValidator => "NONOBVIOUS_UNKNOWN_VALIDATOR",
            ValidationErrorCode::UnknownEntity => "NONOBVIOUS_UNKNOWN_ENTITY",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "user.address.city", "tags[2]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "undeclared field present")
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Validation error with full context
#[derive(Debug, Clone)]
pub struct ValidationError {
    code: ValidationErrorCode,
    message: String,
    details: Option<ValidationDetails>,
}

impl ValidationError {
    /// Create an error for a failing field
    pub fn field(code: ValidationErrorCode, details: ValidationDetails) -> Self {
        Self {
            code,
            message: format!("Validation failed: {}", details),
            details: Some(details),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::field(
            ValidationErrorCode::MissingField,
            ValidationDetails::missing_field(field),
        )
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::field(
            ValidationErrorCode::UnknownField,
            ValidationDetails::unknown_field(field),
        )
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::field(
            ValidationErrorCode::NullValue,
            ValidationDetails::null_value(field),
        )
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::field(
            ValidationErrorCode::TypeMismatch,
            ValidationDetails::new(field, expected, actual),
        )
    }

    /// Create an error for a validator spec that names nothing known
    pub fn unknown_validator(spec: impl Into<String>) -> Self {
        let spec = spec.into();
        Self {
            code: ValidationErrorCode::UnknownValidator,
            message: format!("Unknown validator spec '{}'", spec),
            details: None,
        }
    }

    /// Create an error for an embedded entity that cannot be resolved
    pub fn unknown_entity(field: impl Into<String>, entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::field(
            ValidationErrorCode::UnknownEntity,
            ValidationDetails::new(
                field,
                format!("registered entity '{}'", entity),
                "no such entity",
            ),
        )
    }

    pub fn code(&self) -> ValidationErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }

    /// Path of the failing field, if the error concerns one
    pub fn field_path(&self) -> Option<&str> {
        self.details.as_ref().map(|d| d.field.as_str())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_prefixed() {
        assert_eq!(
            ValidationErrorCode::MissingField.code(),
            "NONOBVIOUS_MISSING_FIELD"
        );
        assert_eq!(
            ValidationErrorCode::NaiveTemporal.code(),
            "NONOBVIOUS_NAIVE_TEMPORAL"
        );
    }

    #[test]
    fn test_details_display() {
        let details = ValidationDetails::new("age", "integer", "string");
        let display = details.to_string();
        assert!(display.contains("age"));
        assert!(display.contains("integer"));
        assert!(display.contains("string"));
    }

    #[test]
    fn test_error_display_includes_code() {
        let err = ValidationError::missing_field("email");
        let display = err.to_string();
        assert!(display.starts_with("[NONOBVIOUS_MISSING_FIELD]"));
        assert!(display.contains("email"));
        assert_eq!(err.field_path(), Some("email"));
    }

    #[test]
    fn test_unknown_validator_has_no_field() {
        let err = ValidationError::unknown_validator("strnig");
        assert_eq!(err.code(), ValidationErrorCode::UnknownValidator);
        assert!(err.details().is_none());
        assert!(err.message().contains("strnig"));
    }
}
