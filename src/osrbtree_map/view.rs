//! Collection-shaped projections of a map.
//!
//! These views own nothing: each one borrows the map and forwards to it. Removing through a
//! mutable view removes from the map.

use core::fmt;

use compare::Compare;

use super::{Iter, IterMut, Keys, OSRBTreeMap, Values};

/// The keys of an [`OSRBTreeMap`], seen as a sorted set.
///
/// Created by [`OSRBTreeMap::key_set`].
pub struct KeySet<'a, K, V, C> {
    map: &'a OSRBTreeMap<K, V, C>,
}

/// The keys of an [`OSRBTreeMap`], seen as a sorted set that supports removal.
///
/// Created by [`OSRBTreeMap::key_set_mut`].
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let mut map: OSRBTreeMap<i32, &str> = OSRBTreeMap::from([(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
/// let mut keys = map.key_set_mut();
/// assert!(keys.remove(&2));
/// assert!(!keys.remove(&2));
/// keys.retain(|&k| k != 4);
/// assert_eq!(keys.pop_first(), Some(1));
///
/// assert_eq!(map.into_iter().collect::<Vec<_>>(), [(3, "c")]);
/// ```
pub struct KeySetMut<'a, K, V, C> {
    map: &'a mut OSRBTreeMap<K, V, C>,
}

/// The values of an [`OSRBTreeMap`], in ascending key order.
///
/// Created by [`OSRBTreeMap::value_collection`].
pub struct ValueCollection<'a, K, V, C> {
    map: &'a OSRBTreeMap<K, V, C>,
}

/// The entries of an [`OSRBTreeMap`], seen as a sorted set of pairs.
///
/// Created by [`OSRBTreeMap::entry_set`].
pub struct EntrySet<'a, K, V, C> {
    map: &'a OSRBTreeMap<K, V, C>,
}

/// The entries of an [`OSRBTreeMap`], seen as a sorted set of pairs that supports removal.
///
/// Created by [`OSRBTreeMap::entry_set_mut`].
pub struct EntrySetMut<'a, K, V, C> {
    map: &'a mut OSRBTreeMap<K, V, C>,
}

impl<K, V, C> OSRBTreeMap<K, V, C> {
    /// Returns a read-only set view of the keys.
    pub fn key_set(&self) -> KeySet<'_, K, V, C> {
        KeySet { map: self }
    }

    /// Returns a set view of the keys through which entries can be removed.
    pub fn key_set_mut(&mut self) -> KeySetMut<'_, K, V, C> {
        KeySetMut { map: self }
    }

    /// Returns a read-only view of the values.
    pub fn value_collection(&self) -> ValueCollection<'_, K, V, C> {
        ValueCollection { map: self }
    }

    /// Returns a read-only set view of the entries.
    pub fn entry_set(&self) -> EntrySet<'_, K, V, C> {
        EntrySet { map: self }
    }

    /// Returns a set view of the entries through which entries can be updated or removed.
    pub fn entry_set_mut(&mut self) -> EntrySetMut<'_, K, V, C> {
        EntrySetMut { map: self }
    }
}

impl<'a, K, V, C> KeySet<'a, K, V, C> {
    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.map.contains_key(key)
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&'a K> {
        self.map.first_key()
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&'a K> {
        self.map.last_key()
    }

    /// Gets an iterator over the keys, in ascending order.
    pub fn iter(&self) -> Keys<'a, K, V> {
        self.map.keys()
    }
}

impl<'a, K, V, C> IntoIterator for &KeySet<'a, K, V, C> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, V>;

    fn into_iter(self) -> Keys<'a, K, V> {
        self.iter()
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for KeySet<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, V, C> KeySetMut<'_, K, V, C> {
    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.map.contains_key(key)
    }

    /// Gets an iterator over the keys, in ascending order.
    pub fn iter(&self) -> Keys<'_, K, V> {
        self.map.keys()
    }

    /// Removes the entry for `key`. Returns whether it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.map.remove(key).is_some()
    }

    /// Keeps only the entries whose key satisfies `f`, visiting keys in ascending order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.map.retain(|k, _| f(k));
    }

    /// Removes the smallest key and its entry.
    pub fn pop_first(&mut self) -> Option<K> {
        self.map.pop_first().map(|(k, _)| k)
    }

    /// Removes the largest key and its entry.
    pub fn pop_last(&mut self) -> Option<K> {
        self.map.pop_last().map(|(k, _)| k)
    }

    /// Removes every entry from the map.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for KeySetMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> ValueCollection<'a, K, V, C> {
    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Gets an iterator over the values, in ascending key order.
    pub fn iter(&self) -> Values<'a, K, V> {
        self.map.values()
    }

    /// Returns `true` if some entry holds `value`.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.iter().any(|v| v == value)
    }
}

impl<'a, K, V, C> IntoIterator for &ValueCollection<'a, K, V, C> {
    type Item = &'a V;
    type IntoIter = Values<'a, K, V>;

    fn into_iter(self) -> Values<'a, K, V> {
        self.iter()
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for ValueCollection<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> EntrySet<'a, K, V, C> {
    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` is present and mapped to `value`.
    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
        V: PartialEq,
    {
        self.map.get(key) == Some(value)
    }

    /// Gets an iterator over the entries, in ascending key order.
    pub fn iter(&self) -> Iter<'a, K, V> {
        self.map.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &EntrySet<'a, K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for EntrySet<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, V, C> EntrySetMut<'_, K, V, C> {
    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `key` is present and mapped to `value`.
    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
        V: PartialEq,
    {
        self.map.get(key) == Some(value)
    }

    /// Gets an iterator over the entries, in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.map.iter()
    }

    /// Gets an iterator over the entries with mutable values, in ascending key order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.map.iter_mut()
    }

    /// Removes the entry for `key` only if it is mapped to `value`. Returns whether it was removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::from([(1, 'a'), (2, 'b')]);
    /// let mut entries = map.entry_set_mut();
    /// assert!(!entries.remove(&1, &'z'));
    /// assert!(entries.remove(&1, &'a'));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q, value: &V) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
        V: PartialEq,
    {
        let raw = &mut self.map.raw;
        match raw.find(&self.map.cmp, key) {
            Some(handle) if raw.value(handle) == value => {
                raw.remove_node(handle);
                true
            }
            _ => false,
        }
    }

    /// Keeps only the entries for which `f` returns `true`, visiting them in ascending key order.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }

    /// Removes and returns the entry with the smallest key.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.map.pop_first()
    }

    /// Removes and returns the entry with the largest key.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.map.pop_last()
    }

    /// Removes every entry from the map.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for EntrySetMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn read_only_views_track_the_map() {
        let map = OSRBTreeMap::from([(3, 'c'), (1, 'a'), (2, 'b')]);
        let keys = map.key_set();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&2));
        assert_eq!((keys.first(), keys.last()), (Some(&1), Some(&3)));
        assert_eq!(format!("{keys:?}"), "{1, 2, 3}");

        let values = map.value_collection();
        assert!(values.contains_value(&'b'));
        assert!(!values.contains_value(&'z'));
        assert_eq!(values.iter().collect::<Vec<_>>(), [&'a', &'b', &'c']);

        let entries = map.entry_set();
        assert!(entries.contains(&3, &'c'));
        assert!(!entries.contains(&3, &'a'));
        assert_eq!((&entries).into_iter().count(), 3);
    }

    #[test]
    fn mutable_views_remove_from_the_map() {
        let mut map: OSRBTreeMap<i32, i32> = (0..50).map(|k| (k, k % 7)).collect();

        let mut keys = map.key_set_mut();
        keys.retain(|k| k % 5 != 0);
        assert_eq!(keys.pop_last(), Some(49));
        assert_eq!(keys.len(), 39);

        let mut entries = map.entry_set_mut();
        assert!(!entries.remove(&1, &0));
        assert!(entries.remove(&1, &1));
        for (_, v) in entries.iter_mut() {
            *v += 1;
        }
        entries.retain(|_, v| *v != 1);
        map.raw.validate_invariants();
        assert!(map.values().all(|&v| v != 1));

        map.entry_set_mut().clear();
        assert!(map.key_set().is_empty());
    }
}
