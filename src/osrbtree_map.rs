use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem;
use core::ops::{Bound, Index, RangeBounds};

use alloc::vec::Vec;
use compare::{Compare, Natural, natural};

use crate::error::Result;
use crate::raw::{Arena, Handle, Node, RawOSRBTreeMap, Search, Side, step};

mod capacity;
mod cursor;
mod entry;
mod order_statistic;
mod range;
mod view;

pub use crate::Rank;
pub use cursor::Cursor;
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use range::{Orientation, RangeView, RangeViewMut};
pub use view::{EntrySet, EntrySetMut, KeySet, KeySetMut, ValueCollection};

use range::Span;

/// Asserts that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn assert_ordered_bounds<K, C, R>(cmp: &C, range: &R)
where
    C: Compare<K>,
    R: RangeBounds<K>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let both_excluded =
            matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_));
        let valid = match cmp.compare(start, end) {
            Ordering::Less => true,
            Ordering::Equal => !both_excluded,
            Ordering::Greater => false,
        };
        assert!(valid, "range start is greater than range end in OSRBTreeMap");
    }
}

/// An ordered map based on an order-statistic [red-black tree].
///
/// Entries are kept in the order defined by a [`Compare`] value chosen at construction.
/// [`OSRBTreeMap::new`] orders keys by their [`Ord`] implementation; [`OSRBTreeMap::with_comparator`]
/// accepts any comparator, closures included.
///
/// Every node records the size of its subtree, so besides the usual map operations the tree
/// answers "which key is k-th?" ([`select`](OSRBTreeMap::select)) and "how many keys precede this
/// one?" ([`rank`](OSRBTreeMap::rank)) in O(log n).
///
/// Iterators obtained from functions such as [`OSRBTreeMap::iter`], [`OSRBTreeMap::into_iter`],
/// [`OSRBTreeMap::values`], or [`OSRBTreeMap::keys`] produce their items in key order, and take
/// worst-case logarithmic and amortized constant time per item returned.
///
/// It is a logic error for a key to be modified in such a way that its ordering relative to any
/// other key changes while it is in the map. The behavior resulting from such a logic error is not
/// specified, but will be encapsulated to the `OSRBTreeMap` that observed it and not result in
/// undefined behavior.
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let mut movie_reviews = OSRBTreeMap::new();
///
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// if !movie_reviews.contains_key(&"Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.", movie_reviews.len());
/// }
///
/// movie_reviews.remove(&"The Blues Brothers");
///
/// // The second review in alphabetical order.
/// assert_eq!(movie_reviews.select(1), Ok(&"Pulp Fiction"));
/// assert_eq!(movie_reviews.rank(&"The Godfather"), Ok(2));
///
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
///
/// A custom ordering:
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let mut longest_first = OSRBTreeMap::with_comparator(|a: &&str, b: &&str| b.len().cmp(&a.len()).then(a.cmp(b)));
/// longest_first.insert("fig", 3);
/// longest_first.insert("banana", 1);
/// longest_first.insert("kiwi", 2);
///
/// let keys: Vec<_> = longest_first.keys().copied().collect();
/// assert_eq!(keys, ["banana", "kiwi", "fig"]);
/// ```
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct OSRBTreeMap<K, V, C = Natural<K>> {
    raw: RawOSRBTreeMap<K, V>,
    cmp: C,
}

/// Handle-stepping state shared by every borrowing iterator.
///
/// `remaining` counts the entries between `front` and `back` inclusive; once it reaches zero both
/// ends are spent, whatever the handles say.
struct Walk<'a, K> {
    nodes: &'a Arena<Node<K>>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    forward: Side,
}

impl<K> Clone for Walk<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Walk<'_, K> {}

impl<'a, K> Walk<'a, K> {
    fn next(&mut self) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = step(self.nodes, handle, self.forward);
        Some(handle)
    }

    fn next_back(&mut self) -> Option<Handle> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = step(self.nodes, handle, self.forward.opposite());
        Some(handle)
    }

    fn node(&self, handle: Handle) -> &'a Node<K> {
        let nodes = self.nodes;
        nodes.get(handle)
    }
}

/// An iterator over the entries of an `OSRBTreeMap` or one of its views.
///
/// This `struct` is created by the [`iter`] method on [`OSRBTreeMap`] and by the `iter` methods
/// of the views. Map iterators run in ascending order; view iterators run in the view's order.
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let map = OSRBTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: OSRBTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    walk: Walk<'a, K>,
    values: &'a Arena<V>,
}

/// A mutable iterator over the entries of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`iter_mut`] method on [`OSRBTreeMap`].
///
/// # Examples
///
/// ```
/// use osrb_tree::OSRBTreeMap;
///
/// let mut map = OSRBTreeMap::from([(1, 10), (2, 20)]);
/// for (_, value) in map.iter_mut() {
///     *value += 1;
/// }
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, [11, 21]);
/// ```
///
/// [`iter_mut`]: OSRBTreeMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K, V> {
    walk: Walk<'a, K>,
    values: *mut Option<V>,
    _marker: PhantomData<&'a mut V>,
}

// SAFETY: IterMut hands out `&K` and `&mut V`, exactly like `&mut OSRBTreeMap<K, V>` would.
unsafe impl<K: Sync, V: Send> Send for IterMut<'_, K, V> {}

/// An owning iterator over the entries of an `OSRBTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`OSRBTreeMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `OSRBTreeMap` or one of its views.
///
/// This `struct` is created by the [`keys`] method on [`OSRBTreeMap`].
///
/// [`keys`]: OSRBTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `OSRBTreeMap` or one of its views.
///
/// This `struct` is created by the [`values`] method on [`OSRBTreeMap`].
///
/// [`values`]: OSRBTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`values_mut`] method on [`OSRBTreeMap`].
///
/// [`values_mut`]: OSRBTreeMap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

/// An owning iterator over the keys of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`into_keys`] method on [`OSRBTreeMap`].
///
/// [`into_keys`]: OSRBTreeMap::into_keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoKeys<K, V> {
    inner: IntoIter<K, V>,
}

/// An owning iterator over the values of an `OSRBTreeMap`.
///
/// This `struct` is created by the [`into_values`] method on [`OSRBTreeMap`].
///
/// [`into_values`]: OSRBTreeMap::into_values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoValues<K, V> {
    inner: IntoIter<K, V>,
}

/// An iterator over a sub-range of entries in an `OSRBTreeMap`.
///
/// This `struct` is created by the [`range`] method on [`OSRBTreeMap`].
///
/// [`range`]: OSRBTreeMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over a sub-range of entries in an `OSRBTreeMap`.
///
/// This `struct` is created by the [`range_mut`] method on [`OSRBTreeMap`].
///
/// [`range_mut`]: OSRBTreeMap::range_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct RangeMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<K: Ord, V> OSRBTreeMap<K, V> {
    /// Makes a new, empty `OSRBTreeMap` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub fn new() -> Self {
        OSRBTreeMap::with_comparator(natural())
    }

    /// Builds a map in linear time from `len` entries already sorted by key.
    ///
    /// Only the first `len` entries of `entries` are consumed. The entries must be strictly
    /// increasing; this is not checked, and violating it is a logic error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceExhausted`](crate::Error::SourceExhausted) if `entries` yields fewer
    /// than `len` items.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from_sorted(3, [(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
    /// assert_eq!(map.select(2), Ok(&3));
    /// assert!(OSRBTreeMap::from_sorted(4, [(1, 'a')]).is_err());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn from_sorted<I>(len: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        OSRBTreeMap::from_sorted_with_comparator(len, entries, natural())
    }
}

impl<K, V, C> OSRBTreeMap<K, V, C> {
    /// Makes a new, empty `OSRBTreeMap` ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.first_key_value(), Some((&2, &"b")));
    /// ```
    pub const fn with_comparator(cmp: C) -> Self {
        OSRBTreeMap {
            raw: RawOSRBTreeMap::new(),
            cmp,
        }
    }

    /// Builds a map ordered by `cmp` in linear time from `len` entries already sorted under `cmp`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceExhausted`](crate::Error::SourceExhausted) if `entries` yields fewer
    /// than `len` items.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn from_sorted_with_comparator<I>(len: usize, entries: I, cmp: C) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(OSRBTreeMap {
            raw: RawOSRBTreeMap::from_sorted(len, entries)?,
            cmp,
        })
    }

    /// Replaces the whole content of the map with `len` entries already sorted by key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceExhausted`](crate::Error::SourceExhausted) if `entries` yields fewer
    /// than `len` items, in which case the map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::from([(9, 'z')]);
    /// map.rebuild_from_sorted(2, [(1, 'a'), (2, 'b')]).unwrap();
    /// assert_eq!(map.len(), 2);
    /// assert!(map.rebuild_from_sorted(5, [(1, 'a')]).is_err());
    /// assert_eq!(map.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn rebuild_from_sorted<I>(&mut self, len: usize, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.raw.rebuild_from_sorted(len, entries)
    }

    /// Returns a reference to the map's comparator.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Clears the map, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.find(&self.cmp, key).map(|h| self.raw.value(h))
    }

    /// Returns the stored key-value pair matching the supplied key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(map.get_key_value(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.find(&self.cmp, key).map(|h| self.raw.key_value(h))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let handle = self.raw.find(&self.cmp, key)?;
        Some(self.raw.value_mut(handle))
    }

    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.find(&self.cmp, key).is_some()
    }

    /// Returns the first key-value pair in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// assert_eq!(map.first_key_value(), None);
    /// map.insert(1, "b");
    /// map.insert(2, "a");
    /// assert_eq!(map.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|h| self.raw.key_value(h))
    }

    /// Returns the last key-value pair in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|h| self.raw.key_value(h))
    }

    /// Returns the smallest key in the map.
    #[must_use]
    pub fn first_key(&self) -> Option<&K> {
        self.raw.first().map(|h| self.raw.key(h))
    }

    /// Returns the largest key in the map.
    #[must_use]
    pub fn last_key(&self) -> Option<&K> {
        self.raw.last().map(|h| self.raw.key(h))
    }

    /// Returns the first entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// if let Some(mut entry) = map.first_entry() {
    ///     if *entry.key() > 0 {
    ///         entry.insert("first");
    ///     }
    /// }
    /// assert_eq!(*map.get(&1).unwrap(), "first");
    /// ```
    pub fn first_entry(&mut self) -> Option<OccupiedEntry<'_, K, V>> {
        let handle = self.raw.first()?;
        Some(OccupiedEntry {
            handle,
            tree: &mut self.raw,
        })
    }

    /// Returns the last entry in the map for in-place manipulation.
    pub fn last_entry(&mut self) -> Option<OccupiedEntry<'_, K, V>> {
        let handle = self.raw.last()?;
        Some(OccupiedEntry {
            handle,
            tree: &mut self.raw,
        })
    }

    /// Removes and returns the first element in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// while let Some((key, _val)) = map.pop_first() {
    ///     assert!(map.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(map.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.first().map(|h| self.raw.remove_node(h))
    }

    /// Removes and returns the last element in the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.raw.last().map(|h| self.raw.remove_node(h))
    }

    /// Returns the entry with the greatest key less than or equal to `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(map.floor(&25), Some((&20, &'b')));
    /// assert_eq!(map.floor(&20), Some((&20, &'b')));
    /// assert_eq!(map.lower(&20), Some((&10, &'a')));
    /// assert_eq!(map.ceiling(&25), Some((&30, &'c')));
    /// assert_eq!(map.higher(&30), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn floor<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.floor(&self.cmp, key, true).map(|h| self.raw.key_value(h))
    }

    /// Returns the entry with the least key greater than or equal to `key`.
    pub fn ceiling<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.ceiling(&self.cmp, key, true).map(|h| self.raw.key_value(h))
    }

    /// Returns the entry with the greatest key strictly less than `key`.
    pub fn lower<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.floor(&self.cmp, key, false).map(|h| self.raw.key_value(h))
    }

    /// Returns the entry with the least key strictly greater than `key`.
    pub fn higher<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.ceiling(&self.cmp, key, false).map(|h| self.raw.key_value(h))
    }

    /// Returns the greatest key less than or equal to `key`.
    pub fn floor_key<Q>(&self, key: &Q) -> Option<&K>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.floor(key).map(|(k, _)| k)
    }

    /// Returns the least key greater than or equal to `key`.
    pub fn ceiling_key<Q>(&self, key: &Q) -> Option<&K>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.ceiling(key).map(|(k, _)| k)
    }

    /// Returns the greatest key strictly less than `key`.
    pub fn lower_key<Q>(&self, key: &Q) -> Option<&K>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.lower(key).map(|(k, _)| k)
    }

    /// Returns the least key strictly greater than `key`.
    pub fn higher_key<Q>(&self, key: &Q) -> Option<&K>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.higher(key).map(|(k, _)| k)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old value is returned.
    /// The key is not updated, and replacing a value is not a structural modification.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Compare<K>,
    {
        self.raw.insert(&self.cmp, key, value).1
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in the
    /// map.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the key was previously in
    /// the map.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        self.raw.remove(&self.cmp, key)
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// In other words, remove all pairs `(k, v)` for which `f(&k, &mut v)` returns `false`.
    /// The elements are visited in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map: OSRBTreeMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// // Keep only the elements with even-numbered keys.
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n + m log n), where m is the number of removed elements.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut current = self.raw.first();
        while let Some(handle) = current {
            let (key, value) = self.raw.key_value_mut(handle);
            current = if f(key, value) {
                self.raw.successor(handle)
            } else {
                self.raw.remove_and_advance(handle, Side::Right).1
            };
        }
    }

    /// Moves all elements from `other` into `self`, leaving `other` empty.
    ///
    /// If a key from `other` is already present in `self`, the respective
    /// value from `self` will be overwritten with the respective value from `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::new();
    /// a.insert(1, "a");
    /// a.insert(2, "b");
    /// a.insert(3, "c");
    ///
    /// let mut b = OSRBTreeMap::new();
    /// b.insert(3, "d");
    /// b.insert(4, "e");
    /// b.insert(5, "f");
    ///
    /// a.append(&mut b);
    ///
    /// assert_eq!(a.len(), 5);
    /// assert_eq!(b.len(), 0);
    /// assert_eq!(a[&3], "d");
    /// assert_eq!(a[&5], "f");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n + m): both maps are merged in order and the result is bulk-loaded.
    pub fn append(&mut self, other: &mut Self)
    where
        C: Compare<K>,
    {
        if other.is_empty() {
            return;
        }

        let mut ours = self.raw.drain_to_vec().into_iter().peekable();
        let mut theirs = other.raw.drain_to_vec().into_iter().peekable();
        let mut merged = Vec::with_capacity(ours.len() + theirs.len());

        loop {
            let ordering = match (ours.peek(), theirs.peek()) {
                (Some((a, _)), Some((b, _))) => self.cmp.compare(a, b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            match ordering {
                Ordering::Less => merged.extend(ours.next()),
                Ordering::Greater => merged.extend(theirs.next()),
                Ordering::Equal => {
                    ours.next();
                    merged.extend(theirs.next());
                }
            }
        }

        self.raw.rebuild_from_vec(merged);
    }

    /// Splits the collection into two at the given key. Returns everything after the given key,
    /// including the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::from([(1, "a"), (2, "b"), (3, "c"), (17, "d"), (41, "e")]);
    /// let b = a.split_off(&3);
    ///
    /// assert_eq!(a.len(), 2);
    /// assert_eq!(b.len(), 3);
    /// assert_eq!(b.first_key_value(), Some((&3, &"c")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n): the entries are partitioned by rank and both halves are bulk-loaded.
    #[must_use = "use `retain` to drop the split-off entries"]
    pub fn split_off<Q>(&mut self, key: &Q) -> Self
    where
        Q: ?Sized,
        C: Compare<Q, K> + Clone,
    {
        let at = self.raw.count_before(&self.cmp, key, false);
        let mut head = self.raw.drain_to_vec();
        let tail = head.split_off(at);
        self.raw.rebuild_from_vec(head);
        OSRBTreeMap {
            raw: RawOSRBTreeMap::from_sorted_vec(tail),
            cmp: self.cmp.clone(),
        }
    }

    /// Gets the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut count = OSRBTreeMap::new();
    /// for x in ["a", "b", "a", "c", "a", "b"] {
    ///     count.entry(x).and_modify(|curr| *curr += 1).or_insert(1);
    /// }
    ///
    /// assert_eq!(count[&"a"], 3);
    /// assert_eq!(count[&"b"], 2);
    /// assert_eq!(count[&"c"], 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V>
    where
        C: Compare<K>,
    {
        match self.raw.search(&self.cmp, &key) {
            Search::Found(handle) => Entry::Occupied(OccupiedEntry {
                handle,
                tree: &mut self.raw,
            }),
            Search::Vacant { parent, side } => Entry::Vacant(VacantEntry {
                key,
                parent,
                side,
                tree: &mut self.raw,
            }),
        }
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::Included;
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(3, "a"), (5, "b"), (8, "c")]);
    /// for (&key, &value) in map.range((Included(&4), Included(&8))) {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// assert_eq!(map.range(4..=8).len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; each iteration step is O(1) amortized.
    pub fn range<R>(&self, range: R) -> Range<'_, K, V>
    where
        C: Compare<K>,
        R: RangeBounds<K>,
    {
        assert_ordered_bounds(&self.cmp, &range);
        let span = Span::new(range.start_bound(), range.end_bound());
        Range {
            inner: span.iter(self, Orientation::Ascending),
        }
    }

    /// Constructs a mutable double-ended iterator over a sub-range of elements in the map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut map = OSRBTreeMap::from([("Alice", 0), ("Bob", 0), ("Carol", 0), ("Cheryl", 0)]);
    /// for (_, balance) in map.range_mut("B".."Cheryl") {
    ///     *balance += 100;
    /// }
    /// assert_eq!(map[&"Bob"], 100);
    /// assert_eq!(map[&"Cheryl"], 0);
    /// ```
    pub fn range_mut<R>(&mut self, range: R) -> RangeMut<'_, K, V>
    where
        C: Compare<K>,
        R: RangeBounds<K>,
    {
        assert_ordered_bounds(&self.cmp, &range);
        let span = Span::new(range.start_bound(), range.end_bound());
        let (front, back, remaining) = span.ends(&self.raw, &self.cmp, Orientation::Ascending);
        RangeMut {
            inner: self.iter_mut_between(front, back, remaining, Side::Right),
        }
    }

    /// Consumes the map, returning an iterator over its keys in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(2, "b"), (1, "a")]);
    /// let keys: Vec<i32> = map.into_keys().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn into_keys(self) -> IntoKeys<K, V> {
        IntoKeys {
            inner: self.into_iter(),
        }
    }

    /// Consumes the map, returning an iterator over its values in key order.
    pub fn into_values(self) -> IntoValues<K, V> {
        IntoValues {
            inner: self.into_iter(),
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iter_between(self.raw.first(), self.raw.last(), self.len(), Side::Right)
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let (first, last, len) = (self.raw.first(), self.raw.last(), self.len());
        self.iter_mut_between(first, last, len, Side::Right)
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let mut a = OSRBTreeMap::from([(1, String::from("hello")), (2, String::from("goodbye"))]);
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"), String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn iter_between(&self, front: Option<Handle>, back: Option<Handle>, remaining: usize, forward: Side) -> Iter<'_, K, V> {
        let (nodes, values) = self.raw.parts();
        Iter {
            walk: Walk {
                nodes,
                front,
                back,
                remaining,
                forward,
            },
            values,
        }
    }

    fn iter_mut_between(
        &mut self,
        front: Option<Handle>,
        back: Option<Handle>,
        remaining: usize,
        forward: Side,
    ) -> IterMut<'_, K, V> {
        let (nodes, values) = self.raw.parts_mut();
        IterMut {
            walk: Walk {
                nodes,
                front,
                back,
                remaining,
                forward,
            },
            values,
            _marker: PhantomData,
        }
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for OSRBTreeMap<K, V, C> {
    fn clone(&self) -> Self {
        let entries = self.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        OSRBTreeMap {
            raw: RawOSRBTreeMap::from_sorted_vec(entries),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K: Hash, V: Hash, C> Hash for OSRBTreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for OSRBTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, C> Eq for OSRBTreeMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for OSRBTreeMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for OSRBTreeMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OSRBTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> Default for OSRBTreeMap<K, V> {
    fn default() -> Self {
        OSRBTreeMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OSRBTreeMap<K, V> {
    /// Sorts the entries (stably, so the last of several equal keys wins) and bulk-loads them.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut entries: Vec<(K, V)> = iter.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.dedup_by(|next, kept| {
            let duplicate = next.0 == kept.0;
            if duplicate {
                mem::swap(next, kept);
            }
            duplicate
        });
        OSRBTreeMap {
            raw: RawOSRBTreeMap::from_sorted_vec(entries),
            cmp: natural(),
        }
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for OSRBTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>> Extend<(&'a K, &'a V)> for OSRBTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a OSRBTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut OSRBTreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for OSRBTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(2, "b"), (1, "a")]);
    /// let mut iter = map.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V, C> Index<&Q> for OSRBTreeMap<K, V, C>
where
    Q: ?Sized,
    C: Compare<Q, K>,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OSRBTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn entry(&self, handle: Handle) -> (&'a K, &'a V) {
        let node = self.walk.node(handle);
        let values = self.values;
        (node.key(), values.get(node.value()))
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.walk.next()?;
        Some(self.entry(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }

    fn count(self) -> usize {
        self.walk.remaining
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.walk.next_back()?;
        Some(self.entry(handle))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            walk: self.walk,
            values: self.values,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> IterMut<'a, K, V> {
    fn entry(&self, handle: Handle) -> (&'a K, &'a mut V) {
        let node = self.walk.node(handle);
        // SAFETY: `values` came from the map's value arena, which stays borrowed mutably and
        // structurally untouched for `'a`. Each node owns a distinct value handle and the walk
        // yields every node at most once, so no two returned references alias.
        let value = unsafe { Arena::get_mut_from_ptr(self.values, node.value()) };
        (node.key(), value)
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.walk.next()?;
        Some(self.entry(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walk.remaining, Some(self.walk.remaining))
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.walk.next_back()?;
        Some(self.entry(handle))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.walk.remaining).finish_non_exhaustive()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a K> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a V> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V> Iterator for IntoKeys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoKeys<K, V> {
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for IntoKeys<K, V> {}

impl<K, V> FusedIterator for IntoKeys<K, V> {}

impl<K, V> Iterator for IntoValues<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoValues<K, V> {
    fn next_back(&mut self) -> Option<V> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for IntoValues<K, V> {}

impl<K, V> FusedIterator for IntoValues<K, V> {}

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Range<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for Range<'_, K, V> {}

impl<K, V> FusedIterator for Range<'_, K, V> {}

impl<K, V> Clone for Range<'_, K, V> {
    fn clone(&self) -> Self {
        Range {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Range<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for RangeMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for RangeMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for RangeMut<'_, K, V> {}

impl<K, V> FusedIterator for RangeMut<'_, K, V> {}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn iterators_meet_in_the_middle() {
        let map: OSRBTreeMap<i32, i32> = (0..10).map(|k| (k, k)).collect();
        let mut iter = map.iter();
        let mut seen = Vec::new();
        while let Some((k, _)) = iter.next() {
            seen.push(*k);
            if let Some((k, _)) = iter.next_back() {
                seen.push(*k);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
        assert_eq!(iter.len(), 0);
    }

    #[test]
    fn iter_mut_hands_out_every_value_once() {
        let mut map: OSRBTreeMap<i32, i32> = (0..50).map(|k| (k, 0)).collect();
        let mut iter = map.iter_mut();
        while let (Some((_, a)), Some((_, b))) = (iter.next(), iter.next_back()) {
            *a += 1;
            *b += 1;
        }
        assert!(map.values().all(|&v| v == 1));
        map.raw.validate_invariants();
    }

    #[test]
    fn from_iter_keeps_the_last_duplicate() {
        let map: OSRBTreeMap<i32, char> = vec![(2, 'a'), (1, 'b'), (2, 'c'), (2, 'd'), (1, 'e')].into_iter().collect();
        assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &'e'), (&2, &'d')]);
        map.raw.validate_invariants();
    }

    #[test]
    fn append_and_split_off_rebuild_valid_trees() {
        let mut a: OSRBTreeMap<i32, i32> = (0..100).step_by(2).map(|k| (k, 0)).collect();
        let mut b: OSRBTreeMap<i32, i32> = (0..100).step_by(3).map(|k| (k, 1)).collect();
        a.append(&mut b);
        a.raw.validate_invariants();
        b.raw.validate_invariants();
        assert_eq!(a.len(), 67);
        assert_eq!(a[&6], 1);
        assert_eq!(a[&4], 0);

        let tail = a.split_off(&50);
        a.raw.validate_invariants();
        tail.raw.validate_invariants();
        assert_eq!(a.last_key(), Some(&48));
        assert_eq!(tail.first_key(), Some(&50));
        assert_eq!(a.len() + tail.len(), 67);
    }

    #[test]
    fn retain_removes_nodes_with_two_children() {
        let mut map: OSRBTreeMap<i32, ()> = (0..64).map(|k| (k, ())).collect();
        let mut visited = Vec::new();
        map.retain(|&k, _| {
            visited.push(k);
            k % 3 == 0
        });
        assert_eq!(visited, (0..64).collect::<Vec<_>>());
        assert!(map.keys().all(|k| k % 3 == 0));
        map.raw.validate_invariants();
    }

    #[test]
    fn each_pop_is_one_structural_change() {
        let mut map: OSRBTreeMap<i32, i32> = (0..10).map(|k| (k, k)).collect();

        let before = map.raw.mod_count();
        assert_eq!(map.pop_first(), Some((0, 0)));
        assert_eq!(map.raw.mod_count(), before.wrapping_add(1));

        let before = map.raw.mod_count();
        assert_eq!(map.pop_last(), Some((9, 9)));
        assert_eq!(map.raw.mod_count(), before.wrapping_add(1));
        map.raw.validate_invariants();

        let mut empty: OSRBTreeMap<i32, i32> = OSRBTreeMap::new();
        let before = empty.raw.mod_count();
        assert_eq!(empty.pop_first(), None);
        assert_eq!(empty.pop_last(), None);
        assert_eq!(empty.raw.mod_count(), before);
        assert!(empty.is_empty());
    }

    #[test]
    #[should_panic(expected = "range start is greater than range end")]
    fn inverted_range_panics() {
        let map: OSRBTreeMap<i32, ()> = OSRBTreeMap::new();
        let _ = map.range((Bound::Included(5), Bound::Excluded(3)));
    }
}
