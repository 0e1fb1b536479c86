use core::ops::{Index, IndexMut};

use compare::Compare;

use super::OSRBTreeMap;
use crate::Rank;
use crate::error::{Error, Result};

impl<K, V, C> OSRBTreeMap<K, V, C> {
    /// Returns the key at zero-based position `index` in ascending order.
    ///
    /// This is an order-statistic extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index >= self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTreeMap};
    ///
    /// let map: OSRBTreeMap<_, _> = [5, 3, 8, 1].into_iter().map(|k| (k, ())).collect();
    /// assert_eq!(map.select(0), Ok(&1));
    /// assert_eq!(map.select(3), Ok(&8));
    /// assert_eq!(map.select(4), Err(Error::IndexOutOfRange { index: 4, len: 4 }));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn select(&self, index: usize) -> Result<&K> {
        self.get_by_rank(index).map(|(k, _)| k).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len(),
        })
    }

    /// Returns the number of keys strictly less than `key`, which must be present.
    ///
    /// This is an order-statistic extension and is not part of the standard `BTreeMap` API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if `key` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::{Error, OSRBTreeMap};
    ///
    /// let map = OSRBTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(map.rank(&30), Ok(2));
    /// assert_eq!(map.rank(&25), Err(Error::KeyNotFound));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank<Q>(&self, key: &Q) -> Result<usize>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.rank_of(key).ok_or(Error::KeyNotFound)
    }

    /// Returns the entry at `rank` in ascending order, or `None` if out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// assert_eq!(map.get_by_rank(1), Some((&"b", &2)));
    /// assert_eq!(map.get_by_rank(3), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        self.raw.select(rank).map(|h| self.raw.key_value(h))
    }

    /// Returns the entry at `rank` with a mutable value, or `None` if out of range.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        let handle = self.raw.select(rank)?;
        Some(self.raw.key_value_mut(handle))
    }

    /// Returns the rank of `key`, or `None` if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// assert_eq!(map.rank_of(&"c"), Some(2));
    /// assert_eq!(map.rank_of(&"z"), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.find(&self.cmp, key).map(|h| self.raw.rank_of_node(h))
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTreeMap, Rank};
///
/// let mut map = OSRBTreeMap::new();
/// map.insert("a", 1);
/// map.insert("b", 2);
///
/// assert_eq!(map[Rank(0)], 1);
/// ```
impl<K, V, C> Index<Rank> for OSRBTreeMap<K, V, C> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.get_by_rank(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use osrb_tree::{OSRBTreeMap, Rank};
///
/// let mut map = OSRBTreeMap::from([("a", 1), ("b", 2)]);
/// map[Rank(1)] = 5;
///
/// assert_eq!(map.get(&"b"), Some(&5));
/// ```
impl<K, V, C> IndexMut<Rank> for OSRBTreeMap<K, V, C> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.get_by_rank_mut(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn scenario_select_and_rank() {
        let map: OSRBTreeMap<i32, ()> = [5, 3, 8, 1, 4, 7, 9, 2, 6].into_iter().map(|k| (k, ())).collect();
        assert_eq!(map.select(0), Ok(&1));
        assert_eq!(map.select(8), Ok(&9));
        assert_eq!(map.rank(&7), Ok(6));

        let mut map = map;
        map.remove(&5);
        assert_eq!(map.len(), 8);
        assert_eq!(map.rank(&7), Ok(5));
        assert_eq!(map.rank(&5), Err(Error::KeyNotFound));
        assert_eq!(map.select(8), Err(Error::IndexOutOfRange { index: 8, len: 8 }));
    }

    #[test]
    fn reverse_comparator_reverses_ranks() {
        let map = OSRBTreeMap::from_sorted_with_comparator(3, [(3, 'c'), (2, 'b'), (1, 'a')], |a: &i32, b: &i32| b.cmp(a))
            .unwrap();
        assert_eq!(map.select(0), Ok(&3));
        assert_eq!(map.rank(&1), Ok(2));
        assert_eq!(map[Rank(1)], 'b');
    }

    proptest! {
        #[test]
        fn select_and_rank_are_inverse(keys in proptest::collection::btree_set(any::<i16>(), 0..200)) {
            let map: OSRBTreeMap<i16, usize> = keys.iter().enumerate().map(|(i, &k)| (k, i)).collect();
            let sorted: Vec<i16> = keys.into_iter().collect();
            for (i, key) in sorted.iter().enumerate() {
                prop_assert_eq!(map.select(i), Ok(key));
                prop_assert_eq!(map.rank(key), Ok(i));
                prop_assert_eq!(map[Rank(i)], i);
            }
            prop_assert!(map.select(sorted.len()).is_err());
        }
    }
}
