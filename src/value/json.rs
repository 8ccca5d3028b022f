//! Conversions between `Value` and primitive JSON data

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number};

use super::Value;

impl From<serde_json::Value> for Value {
    /// Converts primitive data without interpreting strings; coercion of
    /// dates and times is the job of validators.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl Value {
    /// Renders the value as primitive JSON.
    ///
    /// Temporal values become ISO-8601 strings, sets become arrays and
    /// entities become objects. Non-finite floats become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
            Value::Float(x) => Number::from_f64(*x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => serde_json::Value::String(t.to_iso()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_iso()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Set(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(map) => {
                let obj: Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(obj)
            }
            Value::Entity(entity) => Value::Map(entity.data().clone()).to_json(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{TimeOfDay, Timestamp};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_strings_as_strings() {
        let value = Value::from(json!({"when": "2024-01-01", "n": 3, "x": 1.5, "ok": true}));
        let map = value.as_map().unwrap();

        assert_eq!(map.get("when"), Some(&Value::from("2024-01-01")));
        assert_eq!(map.get("n"), Some(&Value::Int(3)));
        assert_eq!(map.get("x"), Some(&Value::Float(1.5)));
        assert_eq!(map.get("ok"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let value = Value::from(json!(u64::MAX));
        assert_eq!(value.type_name(), "float");
    }

    #[test]
    fn test_arrays_become_frozen_lists() {
        let value = Value::from(json!([1, "two", null]));
        let list = value.as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.get(2).unwrap().is_null());
    }

    #[test]
    fn test_temporal_values_render_iso() {
        let date = Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(date.to_json(), json!("2024-02-29"));

        let time = Value::Time(TimeOfDay::parse("10:00:00Z").unwrap());
        assert_eq!(time.to_json(), json!("10:00:00Z"));

        let dt = Value::DateTime(Timestamp::parse("2024-02-29T10:00:00+01:00").unwrap());
        assert_eq!(dt.to_json(), json!("2024-02-29T10:00:00+01:00"));
    }

    #[test]
    fn test_serde_round_trip_through_json_text() {
        let value = Value::from(json!({"a": [1, 2], "b": {"c": "d"}}));
        let text = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
