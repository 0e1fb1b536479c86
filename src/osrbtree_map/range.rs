//! Bounded, composable views over a key range.
//!
//! A view stores its two bounds in ascending terms together with an [`Orientation`]. A descending
//! view shares the same bounds and simply swaps which end is "first", which neighbour is "higher",
//! and which way iteration runs.

use core::cmp::Ordering;
use core::ops::{Bound, RangeBounds};

use compare::{Compare, Natural};

use super::{Cursor, Iter, IterMut, Keys, OSRBTreeMap, Values};
use crate::error::{Error, Result};
use crate::raw::{Handle, RawOSRBTreeMap, Side};

/// Direction in which a view presents its keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Orientation {
    /// Smallest key first, as ordered by the map's comparator.
    Ascending,
    /// Largest key first.
    Descending,
}

impl Orientation {
    /// Returns the opposite orientation.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Orientation::Ascending => Orientation::Descending,
            Orientation::Descending => Orientation::Ascending,
        }
    }

    /// The child side that leads toward later elements.
    pub(crate) const fn forward(self) -> Side {
        match self {
            Orientation::Ascending => Side::Right,
            Orientation::Descending => Side::Left,
        }
    }
}

/// A borrowed pair of absolute bounds and the navigation they induce on a tree.
pub(super) struct Span<'b, K> {
    lo: Bound<&'b K>,
    hi: Bound<&'b K>,
}

impl<K> Clone for Span<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Span<'_, K> {}

impl<'b, K> Span<'b, K> {
    pub(super) const fn new(lo: Bound<&'b K>, hi: Bound<&'b K>) -> Self {
        Span { lo, hi }
    }

    const UNBOUNDED: Self = Span {
        lo: Bound::Unbounded,
        hi: Bound::Unbounded,
    };

    fn too_low<C: Compare<K>>(&self, cmp: &C, key: &K) -> bool {
        match self.lo {
            Bound::Unbounded => false,
            Bound::Included(lo) => cmp.compare(key, lo) == Ordering::Less,
            Bound::Excluded(lo) => cmp.compare(key, lo) != Ordering::Greater,
        }
    }

    fn too_high<C: Compare<K>>(&self, cmp: &C, key: &K) -> bool {
        match self.hi {
            Bound::Unbounded => false,
            Bound::Included(hi) => cmp.compare(key, hi) == Ordering::Greater,
            Bound::Excluded(hi) => cmp.compare(key, hi) != Ordering::Less,
        }
    }

    pub(super) fn contains<C: Compare<K>>(&self, cmp: &C, key: &K) -> bool {
        !self.too_low(cmp, key) && !self.too_high(cmp, key)
    }

    /// Like [`Self::contains`], but treats both ends as inclusive.
    fn contains_closed<C: Compare<K>>(&self, cmp: &C, key: &K) -> bool {
        let above_lo = match self.lo {
            Bound::Unbounded => true,
            Bound::Included(lo) | Bound::Excluded(lo) => cmp.compare(key, lo) != Ordering::Less,
        };
        let below_hi = match self.hi {
            Bound::Unbounded => true,
            Bound::Included(hi) | Bound::Excluded(hi) => cmp.compare(key, hi) != Ordering::Greater,
        };
        above_lo && below_hi
    }

    fn within<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C, handle: Option<Handle>) -> Option<Handle> {
        handle.filter(|&h| self.contains(cmp, raw.key(h)))
    }

    fn lowest<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> Option<Handle> {
        let handle = match self.lo {
            Bound::Unbounded => raw.first(),
            Bound::Included(lo) => raw.ceiling(cmp, lo, true),
            Bound::Excluded(lo) => raw.ceiling(cmp, lo, false),
        };
        self.within(raw, cmp, handle)
    }

    fn highest<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> Option<Handle> {
        let handle = match self.hi {
            Bound::Unbounded => raw.last(),
            Bound::Included(hi) => raw.floor(cmp, hi, true),
            Bound::Excluded(hi) => raw.floor(cmp, hi, false),
        };
        self.within(raw, cmp, handle)
    }

    /// Least key `>= key` (or `> key`) in the span; a probe below the span yields its lowest key.
    fn ceiling<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C, key: &K, inclusive: bool) -> Option<Handle> {
        if self.too_low(cmp, key) {
            return self.lowest(raw, cmp);
        }
        self.within(raw, cmp, raw.ceiling(cmp, key, inclusive))
    }

    /// Greatest key `<= key` (or `< key`) in the span; a probe above the span yields its highest key.
    fn floor<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C, key: &K, inclusive: bool) -> Option<Handle> {
        if self.too_high(cmp, key) {
            return self.highest(raw, cmp);
        }
        self.within(raw, cmp, raw.floor(cmp, key, inclusive))
    }

    /// First node past the upper bound, where an ascending walk must stop.
    fn high_fence<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> Option<Handle> {
        match self.hi {
            Bound::Unbounded => None,
            Bound::Included(hi) => raw.ceiling(cmp, hi, false),
            Bound::Excluded(hi) => raw.ceiling(cmp, hi, true),
        }
    }

    /// Last node before the lower bound, where a descending walk must stop.
    fn low_fence<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> Option<Handle> {
        match self.lo {
            Bound::Unbounded => None,
            Bound::Included(lo) => raw.floor(cmp, lo, false),
            Bound::Excluded(lo) => raw.floor(cmp, lo, true),
        }
    }

    /// Number of keys below the span.
    fn below<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> usize {
        match self.lo {
            Bound::Unbounded => 0,
            Bound::Included(lo) => raw.count_before(cmp, lo, false),
            Bound::Excluded(lo) => raw.count_before(cmp, lo, true),
        }
    }

    /// Number of keys below or inside the span.
    fn through<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> usize {
        match self.hi {
            Bound::Unbounded => raw.len(),
            Bound::Included(hi) => raw.count_before(cmp, hi, true),
            Bound::Excluded(hi) => raw.count_before(cmp, hi, false),
        }
    }

    fn len<V, C: Compare<K>>(&self, raw: &RawOSRBTreeMap<K, V>, cmp: &C) -> usize {
        self.through(raw, cmp).saturating_sub(self.below(raw, cmp))
    }

    /// First and last node in `orientation` order, plus the count between them.
    pub(super) fn ends<V, C: Compare<K>>(
        &self,
        raw: &RawOSRBTreeMap<K, V>,
        cmp: &C,
        orientation: Orientation,
    ) -> (Option<Handle>, Option<Handle>, usize) {
        let len = self.len(raw, cmp);
        if len == 0 {
            return (None, None, 0);
        }
        let (lowest, highest) = (self.lowest(raw, cmp), self.highest(raw, cmp));
        match orientation {
            Orientation::Ascending => (lowest, highest, len),
            Orientation::Descending => (highest, lowest, len),
        }
    }

    pub(super) fn iter<'m, V, C: Compare<K>>(&self, map: &'m OSRBTreeMap<K, V, C>, orientation: Orientation) -> Iter<'m, K, V> {
        let (front, back, remaining) = self.ends(&map.raw, &map.cmp, orientation);
        map.iter_between(front, back, remaining, orientation.forward())
    }
}

/// Rejects `lo > hi`.
fn check_order<K, C: Compare<K>>(cmp: &C, lo: &Bound<K>, hi: &Bound<K>) -> Result<()> {
    if let (Bound::Included(lo) | Bound::Excluded(lo), Bound::Included(hi) | Bound::Excluded(hi)) = (lo, hi)
        && cmp.compare(lo, hi) == Ordering::Greater
    {
        tracing::debug!("rejected range whose start exceeds its end");
        return Err(Error::InvalidRange);
    }
    Ok(())
}

/// Resolves a request given in `orientation` order against the enclosing `parent` bounds.
///
/// Unbounded request ends inherit the parent's bound. A bounded end must lie inside the parent:
/// an inclusive end strictly so, an exclusive end may coincide with the parent's own bound.
fn narrow<K, C, R>(cmp: &C, parent: Span<'_, K>, orientation: Orientation, range: &R) -> Result<(Bound<K>, Bound<K>)>
where
    K: Clone,
    C: Compare<K>,
    R: RangeBounds<K>,
{
    let (start, end) = (range.start_bound().cloned(), range.end_bound().cloned());
    let (lo, hi) = match orientation {
        Orientation::Ascending => (start, end),
        Orientation::Descending => (end, start),
    };

    for bound in [&lo, &hi] {
        let inside = match bound {
            Bound::Unbounded => true,
            Bound::Included(key) => parent.contains(cmp, key),
            Bound::Excluded(key) => parent.contains_closed(cmp, key),
        };
        if !inside {
            tracing::debug!("rejected view bound outside the enclosing range");
            return Err(Error::KeyOutOfRange);
        }
    }

    let lo = match lo {
        Bound::Unbounded => parent.lo.cloned(),
        bounded => bounded,
    };
    let hi = match hi {
        Bound::Unbounded => parent.hi.cloned(),
        bounded => bounded,
    };
    check_order(cmp, &lo, &hi)?;
    Ok((lo, hi))
}

/// Read-only queries shared by both view types, answered in the view's orientation.
struct Window<'m, 'b, K, V, C> {
    map: &'m OSRBTreeMap<K, V, C>,
    span: Span<'b, K>,
    orientation: Orientation,
}

impl<'m, K, V, C: Compare<K>> Window<'m, '_, K, V, C> {
    fn raw(&self) -> &'m RawOSRBTreeMap<K, V> {
        &self.map.raw
    }

    fn len(&self) -> usize {
        self.span.len(self.raw(), &self.map.cmp)
    }

    fn find(&self, key: &K) -> Option<Handle> {
        let cmp = &self.map.cmp;
        if !self.span.contains(cmp, key) {
            return None;
        }
        self.raw().find(cmp, key)
    }

    fn first(&self) -> Option<Handle> {
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        match self.orientation {
            Orientation::Ascending => self.span.lowest(raw, cmp),
            Orientation::Descending => self.span.highest(raw, cmp),
        }
    }

    fn last(&self) -> Option<Handle> {
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        match self.orientation {
            Orientation::Ascending => self.span.highest(raw, cmp),
            Orientation::Descending => self.span.lowest(raw, cmp),
        }
    }

    /// Nearest key at or before `key` in view order (`inclusive`), or strictly before.
    fn floor(&self, key: &K, inclusive: bool) -> Option<Handle> {
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        match self.orientation {
            Orientation::Ascending => self.span.floor(raw, cmp, key, inclusive),
            Orientation::Descending => self.span.ceiling(raw, cmp, key, inclusive),
        }
    }

    /// Nearest key at or after `key` in view order (`inclusive`), or strictly after.
    fn ceiling(&self, key: &K, inclusive: bool) -> Option<Handle> {
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        match self.orientation {
            Orientation::Ascending => self.span.ceiling(raw, cmp, key, inclusive),
            Orientation::Descending => self.span.floor(raw, cmp, key, inclusive),
        }
    }

    fn select(&self, rank: usize) -> Option<Handle> {
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        let (below, through) = (self.span.below(raw, cmp), self.span.through(raw, cmp));
        if rank >= through.saturating_sub(below) {
            return None;
        }
        match self.orientation {
            Orientation::Ascending => raw.select(below + rank),
            Orientation::Descending => raw.select(through - 1 - rank),
        }
    }

    fn rank_of(&self, key: &K) -> Option<usize> {
        let handle = self.find(key)?;
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        let rank = raw.rank_of_node(handle);
        Some(match self.orientation {
            Orientation::Ascending => rank - self.span.below(raw, cmp),
            Orientation::Descending => self.span.through(raw, cmp) - 1 - rank,
        })
    }

    fn iter(&self) -> Iter<'m, K, V> {
        self.span.iter(self.map, self.orientation)
    }

    fn cursor(&self) -> Cursor {
        let (raw, cmp) = (self.raw(), &self.map.cmp);
        let (next, _, _) = self.span.ends(raw, cmp, self.orientation);
        let fence = match self.orientation {
            Orientation::Ascending => self.span.high_fence(raw, cmp),
            Orientation::Descending => self.span.low_fence(raw, cmp),
        };
        Cursor::new(next, fence, raw.mod_count(), self.orientation)
    }

    fn compare_keys(&self, a: &K, b: &K) -> Ordering {
        let ordering = self.map.cmp.compare(a, b);
        match self.orientation {
            Orientation::Ascending => ordering,
            Orientation::Descending => ordering.reverse(),
        }
    }
}

/// A read-only view of the entries of an [`OSRBTreeMap`] whose keys fall within a range.
///
/// Created by [`OSRBTreeMap::range_view`] or [`OSRBTreeMap::descending_view`], and narrowed further
/// with [`sub_view`](RangeView::sub_view), [`head_view`](RangeView::head_view) and
/// [`tail_view`](RangeView::tail_view). All queries are answered in the view's
/// [`Orientation`]: in a descending view "first" is the largest key and "higher" means smaller.
///
/// # Examples
///
/// ```
/// use std::ops::Bound;
///
/// use osrb_tree::{OSRBTreeMap, Orientation};
///
/// let map: OSRBTreeMap<i32, char> = (0..10).map(|k| (k, char::from(b'a' + k as u8))).collect();
///
/// let view = map.range_view(2..8).unwrap();
/// assert_eq!(view.len(), 6);
/// assert_eq!(view.first_key_value(), Some((&2, &'c')));
/// assert_eq!(view.ceiling(&-5), Some((&2, &'c')));
/// assert_eq!(view.get_by_rank(1), Some((&3, &'d')));
///
/// let down = view.descending();
/// assert_eq!(down.orientation(), Orientation::Descending);
/// assert_eq!(down.keys().copied().collect::<Vec<_>>(), [7, 6, 5, 4, 3, 2]);
/// assert_eq!(down.higher(&5), Some((&4, &'e')));
///
/// // Narrowing a descending view takes its bounds in view order, high end first.
/// let inner = down.sub_view((Bound::Included(6), Bound::Excluded(3))).unwrap();
/// assert_eq!(inner.keys().copied().collect::<Vec<_>>(), [6, 5, 4]);
/// assert!(down.sub_view(9..).is_err());
/// ```
pub struct RangeView<'a, K, V, C = Natural<K>> {
    map: &'a OSRBTreeMap<K, V, C>,
    lo: Bound<K>,
    hi: Bound<K>,
    orientation: Orientation,
}

/// A view like [`RangeView`] that can also insert, update and remove entries inside its range.
///
/// Created by [`OSRBTreeMap::range_view_mut`] or [`OSRBTreeMap::descending_view_mut`].
///
/// # Examples
///
/// ```
/// use osrb_tree::{Error, OSRBTreeMap};
///
/// let mut map = OSRBTreeMap::from([(1, "a"), (5, "e"), (9, "i")]);
/// let mut view = map.range_view_mut(2..=6).unwrap();
///
/// assert_eq!(view.insert(3, "c"), Ok(None));
/// assert_eq!(view.insert(7, "g"), Err(Error::KeyOutOfRange));
/// assert_eq!(view.pop_first(), Some((3, "c")));
/// assert_eq!(view.remove(&9), None);
/// assert_eq!(view.len(), 1);
///
/// assert_eq!(map.len(), 3);
/// ```
pub struct RangeViewMut<'a, K, V, C = Natural<K>> {
    map: &'a mut OSRBTreeMap<K, V, C>,
    lo: Bound<K>,
    hi: Bound<K>,
    orientation: Orientation,
}

impl<K, V, C> OSRBTreeMap<K, V, C>
where
    K: Clone,
    C: Compare<K>,
{
    /// Returns an ascending view of the entries whose keys fall within `range`.
    ///
    /// Unlike [`range`](OSRBTreeMap::range), the view answers navigation and rank queries relative
    /// to the range, and can be narrowed further.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the range's start is greater than its end.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn range_view<R: RangeBounds<K>>(&self, range: R) -> Result<RangeView<'_, K, V, C>> {
        let (lo, hi) = narrow(&self.cmp, Span::UNBOUNDED, Orientation::Ascending, &range)?;
        Ok(RangeView {
            map: self,
            lo,
            hi,
            orientation: Orientation::Ascending,
        })
    }

    /// Returns an ascending view that can modify the entries whose keys fall within `range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the range's start is greater than its end.
    pub fn range_view_mut<R: RangeBounds<K>>(&mut self, range: R) -> Result<RangeViewMut<'_, K, V, C>> {
        let (lo, hi) = narrow(&self.cmp, Span::UNBOUNDED, Orientation::Ascending, &range)?;
        Ok(RangeViewMut {
            map: self,
            lo,
            hi,
            orientation: Orientation::Ascending,
        })
    }

    /// Returns a view of the whole map in descending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osrb_tree::OSRBTreeMap;
    ///
    /// let map = OSRBTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// let view = map.descending_view();
    /// assert_eq!(view.first_key_value(), Some((&3, &'c')));
    /// assert_eq!(view.rank_of(&3), Some(0));
    /// ```
    pub fn descending_view(&self) -> RangeView<'_, K, V, C> {
        RangeView {
            map: self,
            lo: Bound::Unbounded,
            hi: Bound::Unbounded,
            orientation: Orientation::Descending,
        }
    }

    /// Returns a view that can modify the whole map, in descending key order.
    pub fn descending_view_mut(&mut self) -> RangeViewMut<'_, K, V, C> {
        RangeViewMut {
            map: self,
            lo: Bound::Unbounded,
            hi: Bound::Unbounded,
            orientation: Orientation::Descending,
        }
    }
}

impl<'a, K, V, C> RangeView<'a, K, V, C>
where
    K: Clone,
    C: Compare<K>,
{
    fn window(&self) -> Window<'a, '_, K, V, C> {
        Window {
            map: self.map,
            span: Span::new(self.lo.as_ref(), self.hi.as_ref()),
            orientation: self.orientation,
        }
    }

    fn entry(&self, handle: Option<Handle>) -> Option<(&'a K, &'a V)> {
        let raw = &self.map.raw;
        handle.map(|h| raw.key_value(h))
    }

    /// The order in which this view presents its keys.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the number of entries in the view.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn len(&self) -> usize {
        self.window().len()
    }

    /// Returns `true` if no key of the map falls within the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is in range and present in the map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.window().find(key).is_some()
    }

    /// Returns the value for `key` if it is in range and present.
    pub fn get(&self, key: &K) -> Option<&'a V> {
        self.entry(self.window().find(key)).map(|(_, v)| v)
    }

    /// Returns the first entry in view order.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().first())
    }

    /// Returns the last entry in view order.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().last())
    }

    /// Returns the nearest entry at or before `key` in view order.
    pub fn floor(&self, key: &K) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().floor(key, true))
    }

    /// Returns the nearest entry at or after `key` in view order.
    pub fn ceiling(&self, key: &K) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().ceiling(key, true))
    }

    /// Returns the nearest entry strictly before `key` in view order.
    pub fn lower(&self, key: &K) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().floor(key, false))
    }

    /// Returns the nearest entry strictly after `key` in view order.
    pub fn higher(&self, key: &K) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().ceiling(key, false))
    }

    /// Returns the entry at `rank` in view order.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get_by_rank(&self, rank: usize) -> Option<(&'a K, &'a V)> {
        self.entry(self.window().select(rank))
    }

    /// Returns the position of `key` in view order, if it is in range and present.
    pub fn rank_of(&self, key: &K) -> Option<usize> {
        self.window().rank_of(key)
    }

    /// Gets an iterator over the view's entries, in view order.
    pub fn iter(&self) -> Iter<'a, K, V> {
        self.window().iter()
    }

    /// Gets an iterator over the view's keys, in view order.
    pub fn keys(&self) -> Keys<'a, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the view's values, in view order.
    pub fn values(&self) -> Values<'a, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns a detached, fail-fast cursor over the view.
    ///
    /// The cursor stays bounded by this view's range after the view itself is dropped.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.window().cursor()
    }

    /// Returns the same range in the opposite orientation.
    #[must_use]
    pub fn descending(&self) -> RangeView<'a, K, V, C> {
        RangeView {
            map: self.map,
            lo: self.lo.clone(),
            hi: self.hi.clone(),
            orientation: self.orientation.reverse(),
        }
    }

    /// Narrows the view to `range`, given in view order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyOutOfRange`] if a bound of `range` lies outside this view, or
    /// [`Error::InvalidRange`] if `range` starts after it ends in view order.
    pub fn sub_view<R: RangeBounds<K>>(&self, range: R) -> Result<RangeView<'a, K, V, C>> {
        let window = self.window();
        let (lo, hi) = narrow(&self.map.cmp, window.span, self.orientation, &range)?;
        Ok(RangeView {
            map: self.map,
            lo,
            hi,
            orientation: self.orientation,
        })
    }

    /// Narrows the view to the entries before `end` in view order.
    ///
    /// # Errors
    ///
    /// As for [`sub_view`](RangeView::sub_view).
    pub fn head_view(&self, end: Bound<K>) -> Result<RangeView<'a, K, V, C>> {
        self.sub_view((Bound::Unbounded, end))
    }

    /// Narrows the view to the entries from `start` on in view order.
    ///
    /// # Errors
    ///
    /// As for [`sub_view`](RangeView::sub_view).
    pub fn tail_view(&self, start: Bound<K>) -> Result<RangeView<'a, K, V, C>> {
        self.sub_view((start, Bound::Unbounded))
    }

    /// Compares two keys in this view's order.
    pub fn compare_keys(&self, a: &K, b: &K) -> Ordering {
        self.window().compare_keys(a, b)
    }
}

impl<'a, K, V, C> IntoIterator for &RangeView<'a, K, V, C>
where
    K: Clone,
    C: Compare<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, C> RangeViewMut<'_, K, V, C>
where
    K: Clone,
    C: Compare<K>,
{
    fn span(&self) -> Span<'_, K> {
        Span::new(self.lo.as_ref(), self.hi.as_ref())
    }

    fn window(&self) -> Window<'_, '_, K, V, C> {
        Window {
            map: &*self.map,
            span: self.span(),
            orientation: self.orientation,
        }
    }

    /// Reborrows this view as a read-only [`RangeView`].
    #[must_use]
    pub fn as_view(&self) -> RangeView<'_, K, V, C> {
        RangeView {
            map: &*self.map,
            lo: self.lo.clone(),
            hi: self.hi.clone(),
            orientation: self.orientation,
        }
    }

    /// The order in which this view presents its keys.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns the number of entries in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window().len()
    }

    /// Returns `true` if no key of the map falls within the view.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is in range and present in the map.
    pub fn contains_key(&self, key: &K) -> bool {
        self.window().find(key).is_some()
    }

    /// Returns the value for `key` if it is in range and present.
    pub fn get(&self, key: &K) -> Option<&V> {
        let handle = self.window().find(key)?;
        Some(self.map.raw.value(handle))
    }

    /// Returns a mutable reference to the value for `key` if it is in range and present.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let handle = self.window().find(key)?;
        Some(self.map.raw.value_mut(handle))
    }

    /// Inserts an entry whose key lies inside the view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyOutOfRange`] if `key` is outside the view; the map is left unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if !self.span().contains(&self.map.cmp, &key) {
            tracing::debug!("rejected insertion outside the view's range");
            return Err(Error::KeyOutOfRange);
        }
        Ok(self.map.insert(key, value))
    }

    /// Removes `key` if it is in range, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let handle = self.window().find(key)?;
        Some(self.map.raw.remove_node(handle).1)
    }

    /// Removes and returns the first entry in view order.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.window().first()?;
        Some(self.map.raw.remove_node(handle))
    }

    /// Removes and returns the last entry in view order.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.window().last()?;
        Some(self.map.raw.remove_node(handle))
    }

    /// Gets an iterator over the view's entries, in view order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.window().iter()
    }

    /// Gets a mutable iterator over the view's entries, in view order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let (front, back, remaining) = self.span().ends(&self.map.raw, &self.map.cmp, self.orientation);
        self.map.iter_mut_between(front, back, remaining, self.orientation.forward())
    }

    /// Returns the same range in the opposite orientation.
    pub fn descending(&mut self) -> RangeViewMut<'_, K, V, C> {
        RangeViewMut {
            lo: self.lo.clone(),
            hi: self.hi.clone(),
            orientation: self.orientation.reverse(),
            map: &mut *self.map,
        }
    }

    /// Narrows the view to `range`, given in view order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyOutOfRange`] if a bound of `range` lies outside this view, or
    /// [`Error::InvalidRange`] if `range` starts after it ends in view order.
    pub fn sub_view<R: RangeBounds<K>>(&mut self, range: R) -> Result<RangeViewMut<'_, K, V, C>> {
        let (lo, hi) = narrow(&self.map.cmp, self.span(), self.orientation, &range)?;
        Ok(RangeViewMut {
            map: &mut *self.map,
            lo,
            hi,
            orientation: self.orientation,
        })
    }

    /// Narrows the view to the entries before `end` in view order.
    ///
    /// # Errors
    ///
    /// As for [`sub_view`](RangeViewMut::sub_view).
    pub fn head_view(&mut self, end: Bound<K>) -> Result<RangeViewMut<'_, K, V, C>> {
        self.sub_view((Bound::Unbounded, end))
    }

    /// Narrows the view to the entries from `start` on in view order.
    ///
    /// # Errors
    ///
    /// As for [`sub_view`](RangeViewMut::sub_view).
    pub fn tail_view(&mut self, start: Bound<K>) -> Result<RangeViewMut<'_, K, V, C>> {
        self.sub_view((start, Bound::Unbounded))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn squares() -> OSRBTreeMap<i32, i32> {
        (0..20).map(|k| (k * 2, k * k)).collect()
    }

    fn keys<C: Compare<i32>>(view: &RangeView<'_, i32, i32, C>) -> Vec<i32> {
        view.keys().copied().collect()
    }

    #[test]
    fn probes_outside_the_range_clamp_to_its_ends() {
        let map = squares();
        let view = map.range_view(10..=20).unwrap();
        assert_eq!(view.ceiling(&-100).map(|(k, _)| *k), Some(10));
        assert_eq!(view.higher(&0).map(|(k, _)| *k), Some(10));
        assert_eq!(view.floor(&100).map(|(k, _)| *k), Some(20));
        assert_eq!(view.lower(&100).map(|(k, _)| *k), Some(20));
        assert_eq!(view.ceiling(&21), None);
        assert_eq!(view.floor(&9), None);
    }

    #[test]
    fn descending_swaps_navigation() {
        let map = squares();
        let view = map.range_view(10..20).unwrap().descending();
        assert_eq!(keys(&view), [18, 16, 14, 12, 10]);
        assert_eq!(view.first_key_value().map(|(k, _)| *k), Some(18));
        assert_eq!(view.last_key_value().map(|(k, _)| *k), Some(10));
        assert_eq!(view.ceiling(&15).map(|(k, _)| *k), Some(14));
        assert_eq!(view.floor(&15).map(|(k, _)| *k), Some(16));
        assert_eq!(view.higher(&14).map(|(k, _)| *k), Some(12));
        assert_eq!(view.lower(&14).map(|(k, _)| *k), Some(16));
        assert_eq!(view.compare_keys(&1, &2), Ordering::Greater);
        assert_eq!(view.get_by_rank(0).map(|(k, _)| *k), Some(18));
        assert_eq!(view.rank_of(&10), Some(4));
        assert_eq!(view.rank_of(&20), None);
    }

    #[test]
    fn sub_views_inherit_and_validate_bounds() {
        let map = squares();
        let view = map.range_view(10..30).unwrap();

        assert_eq!(keys(&view.tail_view(Bound::Excluded(20)).unwrap()), [22, 24, 26, 28]);
        assert_eq!(keys(&view.head_view(Bound::Included(14)).unwrap()), [10, 12, 14]);
        assert_eq!(keys(&view.sub_view(..).unwrap()), keys(&view));

        // An exclusive bound may sit on the parent's exclusive bound; an inclusive one may not.
        assert!(view.sub_view(12..30).is_ok());
        assert_eq!(view.sub_view(12..=30).err(), Some(Error::KeyOutOfRange));
        assert_eq!(view.sub_view(8..).err(), Some(Error::KeyOutOfRange));
        assert_eq!(view.sub_view((Bound::Included(20), Bound::Excluded(12))).err(), Some(Error::InvalidRange));
    }

    #[test]
    fn lengths_match_iteration() {
        let map = squares();
        for lo in (-2..42).step_by(3) {
            for hi in (lo..42).step_by(5) {
                let view = map.range_view(lo..hi).unwrap();
                assert_eq!(view.len(), view.iter().count(), "{lo}..{hi}");
                assert_eq!(view.len(), map.range(lo..hi).count(), "{lo}..{hi}");
            }
        }
    }

    #[test]
    fn inverted_request_is_invalid() {
        let map = squares();
        assert_eq!(map.range_view((Bound::Included(5), Bound::Included(4))).err(), Some(Error::InvalidRange));
        assert!(map.range_view((Bound::Excluded(4), Bound::Excluded(4))).unwrap().is_empty());
    }

    #[test]
    fn mutable_view_stays_inside_its_range() {
        let mut map = squares();
        let mut view = map.range_view_mut(10..=14).unwrap();
        assert_eq!(view.insert(11, -1), Ok(None));
        assert_eq!(view.insert(15, -1), Err(Error::KeyOutOfRange));
        assert_eq!(view.remove(&16), None);
        *view.get_mut(&12).unwrap() = 0;
        for (_, v) in view.iter_mut() {
            *v += 1;
        }
        assert_eq!(view.pop_last(), Some((14, 50)));
        let mut down = view.descending();
        assert_eq!(down.pop_first(), Some((12, 1)));
        assert_eq!(down.len(), 2);

        assert_eq!(map.get(&11), Some(&0));
        assert_eq!(map.get(&16), Some(&64));
        map.raw.validate_invariants();
    }
}
