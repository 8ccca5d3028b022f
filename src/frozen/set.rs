//! Immutable ordered set

use std::borrow::Borrow;
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A read-only set with copy-on-write updates.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrozenSet<T> {
    inner: Arc<BTreeSet<T>>,
}

impl<T> FrozenSet<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BTreeSet::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, T> {
        self.inner.iter()
    }

    /// Returns true when both handles share the same storage
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<T: Ord> FrozenSet<T> {
    pub fn contains<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.contains(item)
    }

    /// Whether every member of this set is in `other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.inner.is_subset(&other.inner)
    }
}

impl<T: Ord + Clone> FrozenSet<T> {
    /// Returns a copy including `item`.
    pub fn with(&self, item: T) -> Self {
        if self.inner.contains(&item) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).insert(item);
        next
    }

    /// Returns a copy excluding `item`.
    pub fn without<Q>(&self, item: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if !self.inner.contains(item) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).remove(item);
        next
    }

    pub fn union(&self, other: &Self) -> Self {
        self.inner.union(&other.inner).cloned().collect()
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.inner.intersection(&other.inner).cloned().collect()
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.inner.difference(&other.inner).cloned().collect()
    }
}

impl<T> Default for FrozenSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for FrozenSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<'a, T> IntoIterator for &'a FrozenSet<T> {
    type Item = &'a T;
    type IntoIter = btree_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for FrozenSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.inner.iter()).finish()
    }
}

impl<T: Serialize> Serialize for FrozenSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.as_ref().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + Ord> Deserialize<'de> for FrozenSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = BTreeSet::deserialize(deserializer)?;
        Ok(Self {
            inner: Arc::new(items),
        })
    }
}
