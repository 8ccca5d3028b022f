//! Immutable sequence

use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::slice;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A read-only sequence with copy-on-write updates.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrozenList<T> {
    inner: Arc<Vec<T>>,
}

impl<T> FrozenList<T> {
    /// Creates an empty list
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.inner.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.inner.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.inner.last()
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.inner.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.inner
    }

    /// Returns true when both handles share the same storage
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<T: Clone> FrozenList<T> {
    /// Returns a copy with `item` appended.
    pub fn pushed(&self, item: T) -> Self {
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).push(item);
        next
    }

    /// Returns a copy with the element at `index` replaced, or `None` if out of range.
    pub fn replaced(&self, index: usize, item: T) -> Option<Self> {
        if index >= self.len() {
            return None;
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner)[index] = item;
        Some(next)
    }

    /// Returns a copy with `range` replaced by `items`.
    ///
    /// Bounds beyond the end are clamped, so `set_slice(10..20, x)` on a short
    /// list appends.
    pub fn set_slice<R, I>(&self, range: R, items: I) -> Self
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        let range = clamp_range(&range, self.len());
        let mut next = self.clone();
        let _removed: Vec<T> = Arc::make_mut(&mut next.inner).splice(range, items).collect();
        next
    }

    /// Returns a copy with `range` removed (bounds clamped).
    pub fn delete_slice<R: RangeBounds<usize>>(&self, range: R) -> Self {
        let range = clamp_range(&range, self.len());
        if range.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).drain(range);
        next
    }

    /// Returns a new list with `other` appended.
    pub fn concat(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.inner).extend(other.iter().cloned());
        next
    }

    /// Clones the elements into a plain vector
    pub fn to_vec(&self) -> Vec<T> {
        (*self.inner).clone()
    }
}

/// Clamps arbitrary range bounds to `0..=len` the way slice assignment does.
fn clamp_range<R: RangeBounds<usize>>(range: &R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    }
    .min(len);

    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    }
    .min(len)
    .max(start);

    start..end
}

impl<T> Default for FrozenList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for FrozenList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl<T> From<Vec<T>> for FrozenList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(items),
        }
    }
}

impl<'a, T> IntoIterator for &'a FrozenList<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for FrozenList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.iter()).finish()
    }
}

impl<T: Serialize> Serialize for FrozenList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inner.as_slice().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FrozenList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::deserialize(deserializer).map(Self::from)
    }
}
