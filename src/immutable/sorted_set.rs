use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};

use crate::immutable::sorted_map::SortedMap;

/// An immutable, persistent ordered set: a `SortedMap` with unit values.
///
/// `insert` replaces an element that compares equal under the set's
/// comparator, keeping a single entry at that rank.
pub struct SortedSet<T> {
    map: SortedMap<T, ()>,
}

impl<T> Clone for SortedSet<T> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<T: Clone + Ord> SortedSet<T> {
    pub fn new() -> Self {
        Self {
            map: SortedMap::new(),
        }
    }
}

impl<T: Clone + Ord> Default for SortedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> SortedSet<T> {
    pub fn with_comparator<F>(comparator: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            map: SortedMap::with_comparator(comparator),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    pub fn first(&self) -> Option<&T> {
        self.map.min_entry().map(|(value, _)| value)
    }

    pub fn last(&self) -> Option<&T> {
        self.map.max_entry().map(|(value, _)| value)
    }

    /// Returns the number of elements strictly preceding `value` in set
    /// order, or `None` if the element is absent.
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.map.index_of(value)
    }

    pub fn insert(&self, value: T) -> Self {
        Self {
            map: self.map.insert(value, ()),
        }
    }

    pub fn erase(&self, value: &T) -> Self {
        Self {
            map: self.map.erase(value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.map.keys()
    }
}

impl<T: Clone + PartialEq> PartialEq for SortedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Clone + Hash> Hash for SortedSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<T: Clone + Debug> Debug for SortedSet<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
