//! Linear-time construction from pre-sorted entries.
//!
//! The tree is built top-down by splitting the index range at its middle, so it is perfectly
//! balanced except possibly in its deepest level. Painting exactly that level red makes it a valid
//! red-black tree without a single rotation.

use alloc::vec::Vec;

use crate::error::{Error, Result};

use super::handle::Handle;
use super::node::{Color, Node};
use super::raw_osrbtree_map::RawOSRBTreeMap;

/// Depth at which nodes are painted red in a tree of `len` nodes built by middle splitting.
///
/// Equal to `floor(log2(len + 1))`: every level above is complete, and the level itself is the
/// only one that may be partially filled.
pub(crate) fn compute_red_level(len: usize) -> usize {
    (len + 1).ilog2() as usize
}

/// Pulls entries from the caller's source, remembering how many were consumed.
struct SortedSource<I> {
    entries: I,
    expected: usize,
    consumed: usize,
}

impl<K, V, I> SortedSource<I>
where
    I: Iterator<Item = (K, V)>,
{
    fn next_entry(&mut self) -> Result<(K, V)> {
        let entry = self.entries.next().ok_or(Error::SourceExhausted {
            expected: self.expected,
            actual: self.consumed,
        })?;
        self.consumed += 1;
        Ok(entry)
    }
}

impl<K, V> RawOSRBTreeMap<K, V> {
    /// Builds a tree from the first `len` entries of `entries`, which must already be sorted
    /// and free of duplicates under the map's ordering.
    pub(crate) fn from_sorted<I>(len: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let red_level = compute_red_level(len);
        tracing::debug!(len, red_level, "building tree from sorted entries");

        let mut tree = Self::with_capacity(len);
        let mut source = SortedSource {
            entries: entries.into_iter(),
            expected: len,
            consumed: 0,
        };

        let root = tree.build_subtree(0, 0, len, red_level, &mut source)?;
        tree.root = root;
        tree.settle_weights(root);
        Ok(tree)
    }

    /// Replaces the whole content with a tree built from sorted entries.
    ///
    /// On failure `self` is left exactly as it was.
    pub(crate) fn rebuild_from_sorted<I>(&mut self, len: usize, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut rebuilt = Self::from_sorted(len, entries)?;
        rebuilt.mod_count = self.mod_count;
        rebuilt.bump_mod_count();
        *self = rebuilt;
        Ok(())
    }

    /// Builds a tree from a sorted, duplicate-free vector.
    pub(crate) fn from_sorted_vec(entries: Vec<(K, V)>) -> Self {
        match Self::from_sorted(entries.len(), entries) {
            Ok(tree) => tree,
            Err(_) => unreachable!("a vector yields exactly its length"),
        }
    }

    /// Replaces the whole content with a sorted, duplicate-free vector.
    pub(crate) fn rebuild_from_vec(&mut self, entries: Vec<(K, V)>) {
        let mod_count = self.mod_count;
        *self = Self::from_sorted_vec(entries);
        self.mod_count = mod_count;
        self.bump_mod_count();
    }

    /// Builds the subtree over positions `lo..hi` and returns its root.
    fn build_subtree<I>(
        &mut self,
        level: usize,
        lo: usize,
        hi: usize,
        red_level: usize,
        source: &mut SortedSource<I>,
    ) -> Result<Option<Handle>>
    where
        I: Iterator<Item = (K, V)>,
    {
        if lo >= hi {
            return Ok(None);
        }

        // Lower middle, so a leftover node lands in the right subtree.
        let mid = lo + (hi - lo - 1) / 2;

        let left = self.build_subtree(level + 1, lo, mid, red_level, source)?;

        let (key, value) = source.next_entry()?;
        let color = if level == red_level { Color::Red } else { Color::Black };
        let value = self.values.alloc(value);
        let handle = self.nodes.alloc(Node::new(key, value, None, color));

        if let Some(left) = left {
            self.nodes.get_mut(handle).set_left(Some(left));
            self.nodes.get_mut(left).set_parent(Some(handle));
        }

        let right = self.build_subtree(level + 1, mid + 1, hi, red_level, source)?;
        if let Some(right) = right {
            self.nodes.get_mut(handle).set_right(Some(right));
            self.nodes.get_mut(right).set_parent(Some(handle));
        }

        Ok(Some(handle))
    }

    /// Post-order pass assigning every weight; returns the weight of `handle`.
    fn settle_weights(&mut self, handle: Option<Handle>) -> usize {
        let Some(handle) = handle else { return 0 };
        let node = self.nodes.get(handle);
        let (left, right) = (node.left(), node.right());
        let weight = 1 + self.settle_weights(left) + self.settle_weights(right);
        self.nodes.get_mut(handle).set_weight(weight);
        weight
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use compare::natural;

    #[test]
    fn red_level_is_floor_log2_of_len_plus_one() {
        let cases = [(0, 0), (1, 1), (2, 1), (3, 2), (6, 2), (7, 3), (8, 3), (100, 6), (10_000, 13)];
        for (len, level) in cases {
            assert_eq!(compute_red_level(len), level, "len = {len}");
        }
    }

    // Handles are `u16` in test builds, so no tree here may exceed `Handle::MAX + 1` nodes.
    #[test]
    fn bulk_load_reproduces_the_sequence() {
        for len in [0usize, 1, 2, 3, 4, 5, 100, 10_000] {
            let tree = RawOSRBTreeMap::from_sorted(len, (0..len).map(|i| (i, i * 2))).unwrap();
            tree.validate_invariants();
            assert_eq!(tree.len(), len);

            let mut current = tree.first();
            let mut expected = 0;
            while let Some(handle) = current {
                assert_eq!(tree.key_value(handle), (&expected, &(expected * 2)));
                expected += 1;
                current = tree.successor(handle);
            }
            assert_eq!(expected, len);
        }
    }

    #[test]
    fn bulk_loaded_tree_supports_order_statistics_and_mutation() {
        let mut tree = RawOSRBTreeMap::from_sorted(100, (0..100).map(|i| (i * 2, ()))).unwrap();
        for i in 0..100 {
            assert_eq!(*tree.key(tree.select(i).unwrap()), i * 2);
        }

        for key in (0..200).filter(|k| k % 3 == 0) {
            tree.insert(&natural(), key, ());
            tree.validate_invariants();
        }
        for key in (0..200).filter(|k| k % 4 == 0) {
            tree.remove(&natural(), &key);
            tree.validate_invariants();
        }
    }

    #[test]
    fn extra_entries_are_left_unread() {
        let mut source = (0..10).map(|i| (i, i));
        let tree = RawOSRBTreeMap::from_sorted(4, &mut source).unwrap();
        assert_eq!(tree.len(), 4);
        assert_eq!(source.next(), Some((4, 4)));
    }

    #[test]
    fn short_source_is_reported() {
        let result = RawOSRBTreeMap::from_sorted(5, (0..3).map(|i| (i, i)));
        assert_eq!(result.err(), Some(Error::SourceExhausted { expected: 5, actual: 3 }));
    }

    #[test]
    fn failed_rebuild_leaves_tree_untouched() {
        let mut tree = RawOSRBTreeMap::from_sorted(3, [(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
        let mod_count = tree.mod_count();

        assert!(tree.rebuild_from_sorted(4, [(7, 'x')]).is_err());
        assert_eq!(tree.mod_count(), mod_count);
        assert_eq!(tree.len(), 3);
        tree.validate_invariants();

        tree.rebuild_from_sorted(2, [(7, 'x'), (8, 'y')]).unwrap();
        assert_ne!(tree.mod_count(), mod_count);
        assert_eq!(tree.key_value(tree.first().unwrap()), (&7, &'x'));
        tree.validate_invariants();
    }

    #[test]
    fn every_built_node_is_linked_once() {
        let tree = RawOSRBTreeMap::from_sorted(31, (0..31).map(|i| (i, ()))).unwrap();
        let reds: Vec<usize> = (0..31).filter(|&i| tree.node(tree.select(i).unwrap()).color() == Color::Red).collect();
        // A complete tree of 31 nodes has no partial level, so nothing is painted red.
        assert!(reds.is_empty());
        assert_eq!(tree.weight_of(tree.root()), 31);
    }
}
