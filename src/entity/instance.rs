//! Immutable entity instances

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::def::EntityDef;
use super::errors::EntityResult;
use crate::frozen::FrozenMap;
use crate::value::Value;

/// Longest `{...}` body shown by `Display` before truncation
const DISPLAY_LIMIT: usize = 15;

/// A validated instance of an entity definition.
///
/// Entities have no setters. `copy_with` is the only way to get a changed
/// entity, and it validates the result like `create` does.
#[derive(Clone)]
pub struct Entity {
    def: Arc<EntityDef>,
    data: FrozenMap<String, Value>,
}

impl Entity {
    pub(crate) fn new(def: Arc<EntityDef>, data: FrozenMap<String, Value>) -> Self {
        Self { def, data }
    }

    pub fn def(&self) -> &Arc<EntityDef> {
        &self.def
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn data(&self) -> &FrozenMap<String, Value> {
        &self.data
    }

    /// Value for `key`, falling back to the field default.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key).or_else(|| self.def.default_for(key))
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_entity(&self, key: &str) -> Option<&Entity> {
        self.get(key).and_then(Value::as_entity)
    }

    /// Identical instance sharing the same storage
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// New instance from the current data with `updates` applied, validated
    /// against the definition.
    pub fn copy_with<I, K, V>(&self, updates: I) -> EntityResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let updated = updates
            .into_iter()
            .fold(self.data.clone(), |data, (key, value)| {
                data.with(key.into(), value.into())
            });
        self.def.create(updated)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entity {}

impl PartialEq<FrozenMap<String, Value>> for Entity {
    fn eq(&self, other: &FrozenMap<String, Value>) -> bool {
        self.data == *other
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.data.cmp(&other.data))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name())
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = Value::Map(self.data.clone()).to_string();
        if body.chars().count() > DISPLAY_LIMIT {
            let head: String = body.chars().take(DISPLAY_LIMIT).collect();
            write!(f, "<{} {}...}}>", self.name(), head)
        } else {
            write!(f, "<{} {}>", self.name(), body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Field;

    fn def() -> Arc<EntityDef> {
        EntityDef::builder("MyEntity")
            .field(Field::string("foo").required())
            .field(Field::boolean("flag").default(false))
            .build()
            .unwrap()
    }

    fn foo(value: &str) -> FrozenMap<String, Value> {
        [("foo".to_string(), Value::from(value))].into_iter().collect()
    }

    #[test]
    fn test_display_short() {
        let def = EntityDef::builder("MyEntity")
            .field(Field::string("foo").required())
            .build()
            .unwrap();
        let entity = def.create(foo("baz")).unwrap();
        assert_eq!(entity.to_string(), "<MyEntity {'foo': 'baz'}>");
    }

    #[test]
    fn test_display_truncates_long_bodies() {
        let def = EntityDef::builder("MyEntity")
            .field(Field::string("foo").required())
            .build()
            .unwrap();
        let entity = def.create(foo("snickers bar")).unwrap();
        assert_eq!(entity.to_string(), "<MyEntity {'foo': 'snicke...}>");
    }

    #[test]
    fn test_copy_shares_storage() {
        let entity = def().create(foo("x")).unwrap();
        let copy = entity.copy();
        assert_eq!(entity, copy);
        assert!(FrozenMap::ptr_eq(entity.data(), copy.data()));
    }

    #[test]
    fn test_copy_with_revalidates() {
        let entity = def().create(foo("x")).unwrap();

        let changed = entity.copy_with([("flag", true)]).unwrap();
        assert_eq!(changed.get_bool("flag"), Some(true));
        assert_eq!(entity.get_bool("flag"), Some(false));

        let err = entity.copy_with([("flag", "yes")]).unwrap_err();
        assert_eq!(err.code(), "NONOBVIOUS_TYPE_MISMATCH");
    }

    #[test]
    fn test_equality_with_plain_data() {
        let entity = def().create(foo("x")).unwrap();
        let expected = foo("x").with("flag".to_string(), Value::Bool(false));
        assert!(entity == expected);
    }

    #[test]
    fn test_entities_of_different_definitions_differ() {
        let a = def().create(foo("x")).unwrap();
        let other = EntityDef::builder("Other")
            .field(Field::string("foo").required())
            .field(Field::boolean("flag").default(false))
            .build()
            .unwrap();
        let b = other.create(foo("x")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.data(), b.data());
    }
}
