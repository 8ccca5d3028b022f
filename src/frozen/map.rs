//! Immutable ordered mapping

use std::borrow::Borrow;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A read-only map with copy-on-write updates.
///
/// Keys are kept in sorted order so iteration and rendering are deterministic.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrozenMap<K, V> {
    inner: Arc<BTreeMap<K, V>>,
}

impl<K, V> FrozenMap<K, V> {
    /// Creates an empty map
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BTreeMap::new()),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates entries in key order
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.inner.iter()
    }

    /// Iterates keys in order
    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.inner.keys()
    }

    /// Iterates values in key order
    pub fn values(&self) -> btree_map::Values<'_, K, V> {
        self.inner.values()
    }

    /// Returns true when both handles share the same storage
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Borrow the backing map
    pub fn as_btree_map(&self) -> &BTreeMap<K, V> {
        &self.inner
    }
}

impl<K: Ord, V> FrozenMap<K, V> {
    /// Looks up a key
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.get(key)
    }

    /// Whether the key is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.contains_key(key)
    }
}

impl<K: Ord + Clone, V: Clone> FrozenMap<K, V> {
    /// Returns a copy with `key` set to `value`.
    pub fn with(&self, key: K, value: V) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).insert(key, value);
        next
    }

    /// Returns a copy without `key`. Absent keys yield a handle to the same storage.
    pub fn without<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if !self.inner.contains_key(key) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).remove(key);
        next
    }

    /// Returns a copy with every entry of `other` applied on top of this map.
    pub fn merged(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        let map = Arc::make_mut(&mut next.inner);
        for (k, v) in other.iter() {
            map.insert(k.clone(), v.clone());
        }
        next
    }

    /// Clones the entries into a plain mutable map
    pub fn to_btree_map(&self) -> BTreeMap<K, V> {
        (*self.inner).clone()
    }
}

impl<K, V> Default for FrozenMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for FrozenMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<K, V> From<BTreeMap<K, V>> for FrozenMap<K, V> {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }
}

impl<'a, K, V> IntoIterator for &'a FrozenMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for FrozenMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.iter()).finish()
    }
}

impl<K: Serialize, V: Serialize> Serialize for FrozenMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.as_ref().serialize(serializer)
    }
}

impl<'de, K, V> Deserialize<'de> for FrozenMap<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        BTreeMap::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrozenMap<String, i64> {
        [("a".to_string(), 1), ("b".to_string(), 2)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_with_leaves_original_untouched() {
        let map = sample();
        let updated = map.with("c".to_string(), 3);

        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("c"));
        assert_eq!(updated.get("c"), Some(&3));
        assert!(!FrozenMap::ptr_eq(&map, &updated));
    }

    #[test]
    fn test_with_overwrites_existing_key() {
        let updated = sample().with("a".to_string(), 10);
        assert_eq!(updated.get("a"), Some(&10));
        assert_eq!(updated.len(), 2);
    }

    #[test]
    fn test_without_removes_key() {
        let map = sample();
        let removed = map.without("a");

        assert!(map.contains_key("a"));
        assert!(!removed.contains_key("a"));
        assert_eq!(removed.len(), 1);
    }

    #[test]
    fn test_without_absent_key_shares_storage() {
        let map = sample();
        let same = map.without("zzz");
        assert!(FrozenMap::ptr_eq(&map, &same));
        assert_eq!(map, same);
    }

    #[test]
    fn test_merged_prefers_other() {
        let map = sample();
        let other: FrozenMap<String, i64> = [("b".to_string(), 20), ("c".to_string(), 30)]
            .into_iter()
            .collect();

        let merged = map.merged(&other);
        assert_eq!(merged.get("a"), Some(&1));
        assert_eq!(merged.get("b"), Some(&20));
        assert_eq!(merged.get("c"), Some(&30));
        assert_eq!(map.get("b"), Some(&2));
    }

    #[test]
    fn test_clone_shares_storage() {
        let map = sample();
        let copy = map.clone();
        assert!(FrozenMap::ptr_eq(&map, &copy));
    }

    #[test]
    fn test_iteration_is_sorted() {
        let map: FrozenMap<&str, i32> = [("z", 1), ("a", 2), ("m", 3)].into_iter().collect();
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec!["a", "m", "z"]);
    }

    #[test]
    fn test_serde_as_plain_map() {
        let map = sample();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2}"#);

        let back: FrozenMap<String, i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
