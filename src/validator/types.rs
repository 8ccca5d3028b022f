//! Built-in type validators
//!
//! Each validator accepts its own variant and adapts primitive input where a
//! lossless reading exists (integral floats, ISO date and time strings).
//! Null is always rejected here; see `Nullable`.

use chrono::NaiveDate;

use super::errors::{ValidationDetails, ValidationError, ValidationErrorCode, ValidationResult};
use super::Validator;
use crate::value::{TimeOfDay, Timestamp, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepts any non-null value unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Anything;

impl Validator for Anything {
    fn name(&self) -> String {
        "anything".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        Ok(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl Validator for StringType {
    fn name(&self) -> String {
        "string".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        match value {
            Value::String(_) => Ok(value),
            other => Err(type_error(path, "string", &other)),
        }
    }
}

/// Accepts integers, and floats with no fractional part
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl Validator for IntegerType {
    fn name(&self) -> String {
        "integer".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        match value {
            Value::Int(_) => Ok(value),
            Value::Float(x) if is_integral(x) => Ok(Value::Int(x as i64)),
            other => Err(type_error(path, "integer", &other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl Validator for FloatType {
    fn name(&self) -> String {
        "float".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        match value {
            Value::Float(_) => Ok(value),
            Value::Int(i) => Ok(Value::Float(i as f64)),
            other => Err(type_error(path, "float", &other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl Validator for BooleanType {
    fn name(&self) -> String {
        "boolean".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        match value {
            Value::Bool(_) => Ok(value),
            other => Err(type_error(path, "boolean", &other)),
        }
    }
}

/// Accepts dates and `YYYY-MM-DD` strings
#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl Validator for DateType {
    fn name(&self) -> String {
        "date".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        match value {
            Value::Date(_) => Ok(value),
            Value::String(ref s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| unparseable(path, "date (YYYY-MM-DD)", s)),
            other => Err(type_error(path, "date", &other)),
        }
    }
}

/// Accepts times of day and ISO time strings.
///
/// Times without a UTC offset are rejected unless `naive_ok` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeType {
    pub naive_ok: bool,
}

impl TimeType {
    pub fn new(naive_ok: bool) -> Self {
        Self { naive_ok }
    }
}

impl Validator for TimeType {
    fn name(&self) -> String {
        "time".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        let time = match value {
            Value::Time(t) => t,
            Value::String(ref s) => TimeOfDay::parse(s)
                .ok_or_else(|| unparseable(path, "time (HH:MM:SS[+HH:MM])", s))?,
            other => return Err(type_error(path, "time", &other)),
        };

        if time.is_naive() && !self.naive_ok {
            return Err(naive_error(path, "time", &time.to_iso()));
        }
        Ok(Value::Time(time))
    }
}

/// Accepts datetimes, RFC 3339 strings and naive ISO datetime strings.
///
/// Naive datetimes are rejected unless `naive_ok` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType {
    pub naive_ok: bool,
}

impl DateTimeType {
    pub fn new(naive_ok: bool) -> Self {
        Self { naive_ok }
    }
}

impl Validator for DateTimeType {
    fn name(&self) -> String {
        "datetime".into()
    }

    fn validate(&self, value: Value, path: &str) -> ValidationResult<Value> {
        reject_null(&value, path)?;
        let timestamp = match value {
            Value::DateTime(dt) => dt,
            Value::String(ref s) => Timestamp::parse(s)
                .ok_or_else(|| unparseable(path, "datetime (RFC 3339)", s))?,
            other => return Err(type_error(path, "datetime", &other)),
        };

        if timestamp.is_naive() && !self.naive_ok {
            return Err(naive_error(path, "datetime", &timestamp.to_iso()));
        }
        Ok(Value::DateTime(timestamp))
    }
}

/// Fails with `NULL_VALUE` when `value` is null.
pub(crate) fn reject_null(value: &Value, path: &str) -> ValidationResult<()> {
    if value.is_null() {
        return Err(ValidationError::null_value(path));
    }
    Ok(())
}

/// Creates a type mismatch error naming the actual value's type.
pub(crate) fn type_error(path: &str, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::type_mismatch(path, expected, actual.type_name())
}

fn unparseable(path: &str, expected: &str, input: &str) -> ValidationError {
    ValidationError::type_mismatch(path, expected, format!("string '{}'", input))
}

fn naive_error(path: &str, kind: &str, rendered: &str) -> ValidationError {
    ValidationError::field(
        ValidationErrorCode::NaiveTemporal,
        ValidationDetails::new(
            path,
            format!("{} with a UTC offset", kind),
            format!("naive {} {}", kind, rendered),
        ),
    )
}

fn is_integral(x: f64) -> bool {
    // 2^63 as f64; anything at or above it cannot be represented as i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    x.is_finite() && x.fract() == 0.0 && x >= -LIMIT && x < LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_accepts_integral_float() {
        let result = IntegerType.validate(Value::Float(3.0), "n").unwrap();
        assert_eq!(result, Value::Int(3));
    }

    #[test]
    fn test_integer_rejects_fractional_float_and_strings() {
        let err = IntegerType.validate(Value::Float(3.5), "n").unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::TypeMismatch);

        let err = IntegerType.validate(Value::from("3"), "n").unwrap_err();
        let details = err.details().unwrap();
        assert_eq!(details.expected, "integer");
        assert_eq!(details.actual, "string");
    }

    #[test]
    fn test_float_widens_int() {
        assert_eq!(FloatType.validate(Value::Int(2), "x").unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_null_is_rejected_everywhere() {
        let validators: Vec<Box<dyn Validator>> = vec![
            Box::new(Anything),
            Box::new(StringType),
            Box::new(IntegerType),
            Box::new(FloatType),
            Box::new(BooleanType),
            Box::new(DateType),
            Box::new(TimeType::new(true)),
            Box::new(DateTimeType::new(true)),
        ];
        for validator in validators {
            let err = validator.validate(Value::Null, "f").unwrap_err();
            assert_eq!(err.code(), ValidationErrorCode::NullValue, "{}", validator.name());
        }
    }

    #[test]
    fn test_date_parses_iso_string() {
        let result = DateType.validate(Value::from("2024-02-29"), "d").unwrap();
        assert_eq!(result, Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));

        let err = DateType.validate(Value::from("2023-02-29"), "d").unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::TypeMismatch);
    }

    #[test]
    fn test_time_requires_offset_unless_naive_ok() {
        let err = TimeType::new(false)
            .validate(Value::from("10:00:00"), "t")
            .unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::NaiveTemporal);

        let ok = TimeType::new(true).validate(Value::from("10:00:00"), "t");
        assert!(ok.is_ok());

        let aware = TimeType::new(false).validate(Value::from("10:00:00Z"), "t");
        assert!(aware.is_ok());
    }

    #[test]
    fn test_datetime_requires_offset_unless_naive_ok() {
        let err = DateTimeType::new(false)
            .validate(Value::from("2024-01-01T10:00:00"), "at")
            .unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::NaiveTemporal);
        assert_eq!(err.field_path(), Some("at"));

        let aware = DateTimeType::new(false)
            .validate(Value::from("2024-01-01T10:00:00+02:00"), "at")
            .unwrap();
        assert!(!aware.as_datetime().unwrap().is_naive());
    }

    #[test]
    fn test_huge_float_is_not_an_integer() {
        assert!(IntegerType.validate(Value::Float(1e19), "n").is_err());
        assert!(IntegerType.validate(Value::Float(f64::INFINITY), "n").is_err());
    }
}
