use super::{OSRBTreeMap, Orientation};
use crate::error::{Error, Result};
use crate::raw::{Handle, RawOSRBTreeMap};

/// A detached, fail-fast position in an [`OSRBTreeMap`].
///
/// Unlike the borrowing iterators, a cursor does not hold on to the map: every call takes the map
/// as an argument, so the map can be modified between steps. Any structural change made other than
/// through [`Cursor::remove`] (inserting a new key, removing, clearing or rebuilding) is detected on
/// the next call, which fails with [`Error::ConcurrentModification`]. Replacing the value of an
/// existing key is not a structural change.
///
/// A cursor must only be used with the map that created it.
///
/// # Panics
///
/// The methods may panic if the cursor is passed a map other than the one that created it and that
/// map happens to have seen the same number of structural changes.
///
/// # Examples
///
/// ```
/// use osrb_tree::{Error, OSRBTreeMap};
///
/// let mut map: OSRBTreeMap<i32, i32> = (1..=6).map(|k| (k, k * k)).collect();
///
/// // Remove the even keys while walking.
/// let mut cursor = map.cursor();
/// while let Some((&key, _)) = cursor.next(&map)? {
///     if key % 2 == 0 {
///         cursor.remove(&mut map)?;
///     }
/// }
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 3, 5]);
///
/// // Outside modifications invalidate the cursor.
/// let mut cursor = map.cursor();
/// map.insert(10, 100);
/// assert_eq!(cursor.next(&map), Err(Error::ConcurrentModification));
/// # Ok::<(), Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Cursor {
    next: Option<Handle>,
    last: Option<Handle>,
    // Node at which the walk stops; `None` runs to the end of the map.
    fence: Option<Handle>,
    expected_mod_count: usize,
    orientation: Orientation,
}

impl Cursor {
    pub(super) const fn new(next: Option<Handle>, fence: Option<Handle>, mod_count: usize, orientation: Orientation) -> Self {
        Self {
            next,
            last: None,
            fence,
            expected_mod_count: mod_count,
            orientation,
        }
    }

    /// The direction in which this cursor walks.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn check<K, V>(&self, raw: &RawOSRBTreeMap<K, V>) -> Result<()> {
        let actual = raw.mod_count();
        if actual != self.expected_mod_count {
            tracing::debug!(expected = self.expected_mod_count, actual, "cursor detected a concurrent modification");
            return Err(Error::ConcurrentModification);
        }
        Ok(())
    }

    fn pending(&self) -> Option<Handle> {
        self.next.filter(|&handle| Some(handle) != self.fence)
    }

    /// Returns `true` if [`next`](Cursor::next) would yield another entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConcurrentModification`] if the map was structurally modified since the
    /// cursor was created or last removed an entry.
    pub fn has_next<K, V, C>(&self, map: &OSRBTreeMap<K, V, C>) -> Result<bool> {
        self.check(&map.raw)?;
        Ok(self.pending().is_some())
    }

    /// Advances the cursor and returns the entry it passed over, or `None` at the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConcurrentModification`] if the map was structurally modified since the
    /// cursor was created or last removed an entry.
    pub fn next<'m, K, V, C>(&mut self, map: &'m OSRBTreeMap<K, V, C>) -> Result<Option<(&'m K, &'m V)>> {
        let raw = &map.raw;
        self.check(raw)?;
        let Some(handle) = self.pending() else {
            return Ok(None);
        };
        self.next = match self.orientation {
            Orientation::Ascending => raw.successor(handle),
            Orientation::Descending => raw.predecessor(handle),
        };
        self.last = Some(handle);
        Ok(Some(raw.key_value(handle)))
    }

    /// Removes the entry most recently returned by [`next`](Cursor::next).
    ///
    /// The cursor stays valid: the walk continues with the entry that followed the removed one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalState`] if `next` has not returned an entry since the cursor was
    /// created or last removed one, and [`Error::ConcurrentModification`] if the map was modified
    /// behind the cursor's back.
    pub fn remove<K, V, C>(&mut self, map: &mut OSRBTreeMap<K, V, C>) -> Result<(K, V)> {
        let Some(target) = self.last else {
            tracing::debug!("cursor removal without a preceding call to next");
            return Err(Error::IllegalState);
        };
        self.check(&map.raw)?;

        // Removing a node with two children moves its successor's entry into the node and frees
        // the successor's slot instead.
        let freed = map.raw.freed_by_removal(target);
        if freed != target {
            if self.next == Some(freed) {
                self.next = Some(target);
            }
            if self.fence == Some(freed) {
                self.fence = Some(target);
            }
        }

        let entry = map.raw.remove_node(target);
        self.last = None;
        self.expected_mod_count = map.raw.mod_count();
        Ok(entry)
    }
}

impl<K, V, C> OSRBTreeMap<K, V, C> {
    /// Returns a detached, fail-fast cursor positioned before the first entry.
    ///
    /// See [`Cursor`] for details.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.raw.first(), None, self.raw.mod_count(), Orientation::Ascending)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use core::ops::Bound;

    fn map(len: i32) -> OSRBTreeMap<i32, i32> {
        (0..len).map(|k| (k, -k)).collect()
    }

    fn drain(cursor: &mut Cursor, map: &OSRBTreeMap<i32, i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        while let Some((&k, _)) = cursor.next(map).unwrap() {
            keys.push(k);
        }
        keys
    }

    #[test]
    fn remove_requires_a_preceding_next() {
        let mut map = map(3);
        let mut cursor = map.cursor();
        assert_eq!(cursor.remove(&mut map), Err(Error::IllegalState));

        cursor.next(&map).unwrap();
        assert_eq!(cursor.remove(&mut map), Ok((0, 0)));
        assert_eq!(cursor.remove(&mut map), Err(Error::IllegalState));
        assert_eq!(drain(&mut cursor, &map), [1, 2]);
    }

    #[test]
    fn value_replacement_is_not_a_modification() {
        let mut map = map(3);
        let mut cursor = map.cursor();
        cursor.next(&map).unwrap();
        map.insert(1, 100);
        assert_eq!(cursor.next(&map).unwrap(), Some((&1, &100)));

        map.remove(&2);
        assert_eq!(cursor.has_next(&map), Err(Error::ConcurrentModification));
    }

    #[test]
    fn removing_every_entry_visits_each_once() {
        for len in [1, 2, 7, 64, 129] {
            let mut map = map(len);
            let mut cursor = map.cursor();
            let mut seen = Vec::new();
            while let Some((&k, _)) = cursor.next(&map).unwrap() {
                seen.push(k);
                cursor.remove(&mut map).unwrap();
                map.raw.validate_invariants();
            }
            assert_eq!(seen, (0..len).collect::<Vec<_>>());
            assert!(map.is_empty());
        }
    }

    #[test]
    fn bounded_cursor_survives_removal_next_to_its_fence() {
        let mut map = map(64);
        for hi in 1..63 {
            let mut copy = map.clone();
            let mut cursor = copy.range_view((Bound::Unbounded, Bound::Included(hi))).unwrap().cursor();
            let mut seen = Vec::new();
            while let Some((&k, _)) = cursor.next(&copy).unwrap() {
                seen.push(k);
                cursor.remove(&mut copy).unwrap();
            }
            assert_eq!(seen, (0..=hi).collect::<Vec<_>>(), "hi = {hi}");
            assert_eq!(copy.first_key(), Some(&(hi + 1)));
            copy.raw.validate_invariants();
        }
        map.clear();
        assert!(!map.cursor().has_next(&map).unwrap());
    }

    #[test]
    fn descending_cursor_removes_in_reverse() {
        let mut map = map(20);
        let mut cursor = map.range_view(5..15).unwrap().descending().cursor();
        assert_eq!(cursor.orientation(), Orientation::Descending);
        let mut seen = Vec::new();
        while let Some((&k, _)) = cursor.next(&map).unwrap() {
            seen.push(k);
            if k % 3 == 0 {
                cursor.remove(&mut map).unwrap();
            }
        }
        assert_eq!(seen, (5..15).rev().collect::<Vec<_>>());
        assert_eq!(map.len(), 17);
        assert!(!map.contains_key(&6) && !map.contains_key(&9) && !map.contains_key(&12));
    }

    #[test]
    #[should_panic]
    fn foreign_map_with_matching_mod_count_panics() {
        let source = map(10);
        let other: OSRBTreeMap<i32, i32> = OSRBTreeMap::new();
        assert_eq!(source.raw.mod_count(), other.raw.mod_count());
        let mut cursor = source.cursor();
        let _ = cursor.next(&other);
    }
}
