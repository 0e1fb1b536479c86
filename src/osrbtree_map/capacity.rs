use compare::natural;

use super::OSRBTreeMap;
use crate::raw::RawOSRBTreeMap;

impl<K: Ord, V> OSRBTreeMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries before reallocating.
    ///
    /// This is an extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map: OSRBTreeMap<i32, i32> = OSRBTreeMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, natural())
    }
}

impl<K, V, C> OSRBTreeMap<K, V, C> {
    /// Creates an empty map ordered by `cmp`, with room for at least `capacity` entries.
    #[must_use]
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        OSRBTreeMap {
            raw: RawOSRBTreeMap::with_capacity(capacity),
            cmp,
        }
    }

    /// Returns the number of entries the map can hold without reallocating.
    ///
    /// Removed entries leave reusable slots behind, so the capacity never shrinks.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}

