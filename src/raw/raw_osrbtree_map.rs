use core::cmp::Ordering;
use core::mem;

use alloc::vec::Vec;
use compare::Compare;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Color, Node, Side};

/// The core red-black tree backing `OSRBTreeMap`.
///
/// The tree never compares keys on its own; every operation that needs an ordering takes the
/// comparator as an argument, so the map is free to carry any `Compare` implementation.
pub(crate) struct RawOSRBTreeMap<K, V> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<K>>,
    /// Arena storing all values, addressed by the handle held in each node.
    pub(super) values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    pub(super) root: Option<Handle>,
    /// Bumped on every structural change; cursors compare against it.
    pub(super) mod_count: usize,
}

/// Outcome of a comparator-guided descent.
pub(crate) enum Search {
    /// The key is present at this node.
    Found(Handle),
    /// The key is absent; it belongs in `side` of `parent` (or at the root when `parent` is `None`).
    Vacant { parent: Option<Handle>, side: Side },
}

/// Descends from `handle` to the extreme node on `side`.
pub(crate) fn extreme<K>(nodes: &Arena<Node<K>>, mut handle: Handle, side: Side) -> Handle {
    while let Some(child) = nodes.get(handle).child(side) {
        handle = child;
    }
    handle
}

/// Climbs from `handle` while it is the `side` child of its parent, returning the first ancestor
/// reached from the other side.
fn climb<K>(nodes: &Arena<Node<K>>, mut handle: Handle, side: Side) -> Option<Handle> {
    let mut parent = nodes.get(handle).parent();
    while let Some(p) = parent {
        if nodes.get(p).child(side) != Some(handle) {
            break;
        }
        handle = p;
        parent = nodes.get(p).parent();
    }
    parent
}

/// In-order neighbour of `handle` toward `side` (`Right` for the successor).
pub(crate) fn step<K>(nodes: &Arena<Node<K>>, handle: Handle, side: Side) -> Option<Handle> {
    match nodes.get(handle).child(side) {
        Some(child) => Some(extreme(nodes, child, side.opposite())),
        None => climb(nodes, handle, side),
    }
}

impl<K, V> RawOSRBTreeMap<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            mod_count: 0,
        }
    }

    /// Creates a new tree with room for `capacity` entries.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            mod_count: 0,
        }
    }

    /// Returns the number of entries, read from the root's weight.
    pub(crate) fn len(&self) -> usize {
        self.weight_of(self.root)
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.values.capacity()
    }

    pub(crate) const fn mod_count(&self) -> usize {
        self.mod_count
    }

    #[cfg(test)]
    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Removes every entry.
    pub(crate) fn clear(&mut self) {
        tracing::trace!(len = self.len(), "clearing tree");
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.bump_mod_count();
    }

    /// Drains all entries in ascending order. O(n), no rebalancing.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.len());
        let mut current = self.first();
        while let Some(handle) = current {
            order.push(handle);
            current = self.successor(handle);
        }

        let mut result = Vec::with_capacity(order.len());
        for handle in order {
            let (key, value) = self.nodes.take(handle).into_payload();
            result.push((key, self.values.take(value)));
        }
        self.root = None;
        self.clear();
        result
    }

    #[cfg(test)]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(self.nodes.get(handle).value())
    }

    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        let value = self.nodes.get(handle).value();
        self.values.get_mut(value)
    }

    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    pub(crate) fn key_value_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get_mut(node.value()))
    }

    /// Shared node arena and value arena, for borrowing iterators.
    pub(crate) fn parts(&self) -> (&Arena<Node<K>>, &Arena<V>) {
        (&self.nodes, &self.values)
    }

    /// Shared node arena plus a base pointer into the value arena, for mutable iterators.
    pub(crate) fn parts_mut(&mut self) -> (&Arena<Node<K>>, *mut Option<V>) {
        (&self.nodes, self.values.slots_mut_ptr())
    }

    // ---------------------------------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------------------------------

    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| extreme(&self.nodes, root, Side::Left))
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| extreme(&self.nodes, root, Side::Right))
    }

    pub(crate) fn successor(&self, handle: Handle) -> Option<Handle> {
        step(&self.nodes, handle, Side::Right)
    }

    pub(crate) fn predecessor(&self, handle: Handle) -> Option<Handle> {
        step(&self.nodes, handle, Side::Left)
    }

    /// Descends looking for `key`, reporting either its node or where it would be linked.
    pub(crate) fn search<Q, C>(&self, cmp: &C, key: &Q) -> Search
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            side = match cmp.compare(key, node.key()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Search::Found(handle),
            };
            parent = Some(handle);
            current = node.child(side);
        }

        Search::Vacant { parent, side }
    }

    pub(crate) fn find<Q, C>(&self, cmp: &C, key: &Q) -> Option<Handle>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        match self.search(cmp, key) {
            Search::Found(handle) => Some(handle),
            Search::Vacant { .. } => None,
        }
    }

    /// Least node `>= key` (`inclusive`) or `> key` (exclusive).
    pub(crate) fn ceiling<Q, C>(&self, cmp: &C, key: &Q, inclusive: bool) -> Option<Handle>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            match cmp.compare(key, node.key()) {
                Ordering::Equal if inclusive => return Some(current),
                Ordering::Less => match node.left() {
                    Some(left) => current = left,
                    None => return Some(current),
                },
                _ => match node.right() {
                    Some(right) => current = right,
                    None => return climb(&self.nodes, current, Side::Right),
                },
            }
        }
    }

    /// Greatest node `<= key` (`inclusive`) or `< key` (exclusive).
    pub(crate) fn floor<Q, C>(&self, cmp: &C, key: &Q, inclusive: bool) -> Option<Handle>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            match cmp.compare(key, node.key()) {
                Ordering::Equal if inclusive => return Some(current),
                Ordering::Greater => match node.right() {
                    Some(right) => current = right,
                    None => return Some(current),
                },
                _ => match node.left() {
                    Some(left) => current = left,
                    None => return climb(&self.nodes, current, Side::Left),
                },
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Order statistics
    // ---------------------------------------------------------------------------------------------

    /// Node holding the `index`-th smallest key.
    pub(crate) fn select(&self, mut index: usize) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let left_weight = self.weight_of(node.left());
            match index.cmp(&left_weight) {
                Ordering::Less => current = node.left(),
                Ordering::Equal => return Some(handle),
                Ordering::Greater => {
                    index -= left_weight + 1;
                    current = node.right();
                }
            }
        }
        None
    }

    /// Zero-based position of `handle` in ascending order, found by climbing parent links.
    pub(crate) fn rank_of_node(&self, handle: Handle) -> usize {
        let mut rank = self.weight_of(self.nodes.get(handle).left());
        let mut child = handle;
        while let Some(parent) = self.nodes.get(child).parent() {
            let parent_node = self.nodes.get(parent);
            if parent_node.right() == Some(child) {
                rank += self.weight_of(parent_node.left()) + 1;
            }
            child = parent;
        }
        rank
    }

    /// Number of keys `< key`, or `<= key` when `inclusive`.
    pub(crate) fn count_before<Q, C>(&self, cmp: &C, key: &Q, inclusive: bool) -> usize
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let mut count = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let goes_right = match cmp.compare(key, node.key()) {
                Ordering::Less => false,
                Ordering::Equal => inclusive,
                Ordering::Greater => true,
            };
            if goes_right {
                count += self.weight_of(node.left()) + 1;
                current = node.right();
            } else {
                current = node.left();
            }
        }
        count
    }

    // ---------------------------------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------------------------------

    /// Inserts or replaces. Returns the entry's node and the displaced value, if any.
    pub(crate) fn insert<C>(&mut self, cmp: &C, key: K, value: V) -> (Handle, Option<V>)
    where
        C: Compare<K>,
    {
        match self.search(cmp, &key) {
            Search::Found(handle) => {
                let old = mem::replace(self.value_mut(handle), value);
                (handle, Some(old))
            }
            Search::Vacant { parent, side } => (self.insert_at(parent, side, key, value), None),
        }
    }

    /// Links a new red leaf below `parent` and rebalances.
    ///
    /// The caller guarantees the position came from [`Self::search`] with no mutation since.
    pub(crate) fn insert_at(&mut self, parent: Option<Handle>, side: Side, key: K, value: V) -> Handle {
        let value = self.values.alloc(value);
        let handle = self.nodes.alloc(Node::new(key, value, parent, Color::Red));

        match parent {
            None => self.root = Some(handle),
            Some(parent) => self.nodes.get_mut(parent).set_child(side, Some(handle)),
        }

        let mut ancestor = parent;
        while let Some(a) = ancestor {
            let node = self.nodes.get_mut(a);
            node.set_weight(node.weight() + 1);
            ancestor = node.parent();
        }

        self.fix_after_insertion(handle);
        self.bump_mod_count();
        handle
    }

    pub(crate) fn remove<Q, C>(&mut self, cmp: &C, key: &Q) -> Option<(K, V)>
    where
        Q: ?Sized,
        C: Compare<Q, K>,
    {
        let handle = self.find(cmp, key)?;
        Some(self.remove_node(handle))
    }

    /// The node whose slot is freed when `handle` is removed.
    ///
    /// A node with two children takes over its successor's entry, so the successor's slot goes.
    pub(crate) fn freed_by_removal(&self, handle: Handle) -> Handle {
        let node = self.nodes.get(handle);
        match (node.has_two_children(), node.right()) {
            (true, Some(right)) => extreme(&self.nodes, right, Side::Left),
            _ => handle,
        }
    }

    /// Unlinks the entry at `handle` and rebalances, returning the entry.
    pub(crate) fn remove_node(&mut self, handle: Handle) -> (K, V) {
        let doomed = self.freed_by_removal(handle);
        if doomed != handle {
            let (node, successor) = self.nodes.get_pair_mut(handle, doomed);
            node.swap_payload(successor);
        }

        let mut ancestor = self.nodes.get(doomed).parent();
        while let Some(a) = ancestor {
            let node = self.nodes.get_mut(a);
            node.set_weight(node.weight() - 1);
            ancestor = node.parent();
        }
        self.nodes.get_mut(doomed).set_weight(0);

        let node = self.nodes.get(doomed);
        let replacement = node.left().or(node.right());
        let parent = node.parent();
        let color = node.color();

        if let Some(replacement) = replacement {
            self.nodes.get_mut(replacement).set_parent(parent);
            self.replace_child(parent, doomed, Some(replacement));
            if color == Color::Black {
                self.fix_after_deletion(replacement);
            }
        } else if parent.is_none() {
            self.root = None;
        } else {
            // Childless: rebalance around the node as a zero-weight phantom, then unlink it.
            if color == Color::Black {
                self.fix_after_deletion(doomed);
            }
            if let Some(parent) = self.nodes.get(doomed).parent() {
                self.replace_child(Some(parent), doomed, None);
            }
        }

        self.bump_mod_count();
        let (key, value) = self.nodes.take(doomed).into_payload();
        (key, self.values.take(value))
    }

    /// Removes the entry at `handle` and returns it with the next node toward `side`.
    pub(crate) fn remove_and_advance(&mut self, handle: Handle, side: Side) -> ((K, V), Option<Handle>) {
        let freed = self.freed_by_removal(handle);
        let mut next = step(&self.nodes, handle, side);
        if next == Some(freed) && freed != handle {
            next = Some(handle);
        }
        (self.remove_node(handle), next)
    }

    // ---------------------------------------------------------------------------------------------
    // Balancing
    // ---------------------------------------------------------------------------------------------

    #[inline]
    pub(super) fn bump_mod_count(&mut self) {
        self.mod_count = self.mod_count.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn weight_of(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.nodes.get(h).weight())
    }

    fn color_of(&self, handle: Option<Handle>) -> Color {
        handle.map_or(Color::Black, |h| self.nodes.get(h).color())
    }

    fn parent_of(&self, handle: Option<Handle>) -> Option<Handle> {
        handle.and_then(|h| self.nodes.get(h).parent())
    }

    fn child_of(&self, handle: Option<Handle>, side: Side) -> Option<Handle> {
        handle.and_then(|h| self.nodes.get(h).child(side))
    }

    fn set_color(&mut self, handle: Option<Handle>, color: Color) {
        if let Some(h) = handle {
            self.nodes.get_mut(h).set_color(color);
        }
    }

    fn side_of(&self, parent: Handle, child: Handle) -> Side {
        if self.nodes.get(parent).left() == Some(child) { Side::Left } else { Side::Right }
    }

    fn update_weight(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let weight = 1 + self.weight_of(node.left()) + self.weight_of(node.right());
        self.nodes.get_mut(handle).set_weight(weight);
    }

    /// Points `parent`'s link to `old` (or the root, when `parent` is `None`) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let side = self.side_of(parent, old);
                self.nodes.get_mut(parent).set_child(side, new);
            }
        }
    }

    /// Rotates `pivot` down toward `direction`; its child on the other side takes its place.
    fn rotate(&mut self, pivot: Handle, direction: Side) {
        let Some(riser) = self.nodes.get(pivot).child(direction.opposite()) else {
            return;
        };

        let inner = self.nodes.get(riser).child(direction);
        self.nodes.get_mut(pivot).set_child(direction.opposite(), inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(pivot));
        }

        let parent = self.nodes.get(pivot).parent();
        self.nodes.get_mut(riser).set_parent(parent);
        self.replace_child(parent, pivot, Some(riser));

        self.nodes.get_mut(riser).set_child(direction, Some(pivot));
        self.nodes.get_mut(pivot).set_parent(Some(riser));

        // Only these two subtrees changed; children are already correct.
        self.update_weight(pivot);
        self.update_weight(riser);
    }

    fn fix_after_insertion(&mut self, mut x: Handle) {
        self.nodes.get_mut(x).set_color(Color::Red);

        while Some(x) != self.root {
            let Some(parent) = self.nodes.get(x).parent() else { break };
            if self.nodes.get(parent).color() != Color::Red {
                break;
            }
            // A red parent is never the root.
            let Some(grandparent) = self.nodes.get(parent).parent() else { break };

            let side = self.side_of(grandparent, parent);
            let uncle = self.nodes.get(grandparent).child(side.opposite());

            if self.color_of(uncle) == Color::Red {
                self.set_color(Some(parent), Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(Some(grandparent), Color::Red);
                x = grandparent;
            } else {
                if self.nodes.get(parent).child(side.opposite()) == Some(x) {
                    x = parent;
                    self.rotate(x, side);
                }
                let parent = self.parent_of(Some(x));
                let grandparent = self.parent_of(parent);
                self.set_color(parent, Color::Black);
                self.set_color(grandparent, Color::Red);
                if let Some(grandparent) = grandparent {
                    self.rotate(grandparent, side.opposite());
                }
            }
        }

        self.set_color(self.root, Color::Black);
    }

    fn fix_after_deletion(&mut self, mut x: Handle) {
        while Some(x) != self.root && self.nodes.get(x).color() == Color::Black {
            let Some(parent) = self.nodes.get(x).parent() else { break };
            let side = self.side_of(parent, x);
            let far = side.opposite();

            let mut sibling = self.nodes.get(parent).child(far);
            if self.color_of(sibling) == Color::Red {
                self.set_color(sibling, Color::Black);
                self.set_color(Some(parent), Color::Red);
                self.rotate(parent, side);
                sibling = self.nodes.get(parent).child(far);
            }

            if self.color_of(self.child_of(sibling, side)) == Color::Black
                && self.color_of(self.child_of(sibling, far)) == Color::Black
            {
                self.set_color(sibling, Color::Red);
                x = parent;
            } else {
                if self.color_of(self.child_of(sibling, far)) == Color::Black {
                    self.set_color(self.child_of(sibling, side), Color::Black);
                    self.set_color(sibling, Color::Red);
                    if let Some(s) = sibling {
                        self.rotate(s, far);
                    }
                    sibling = self.nodes.get(parent).child(far);
                }
                let parent_color = self.nodes.get(parent).color();
                self.set_color(sibling, parent_color);
                self.set_color(Some(parent), Color::Black);
                self.set_color(self.child_of(sibling, far), Color::Black);
                self.rotate(parent, side);
                match self.root {
                    Some(root) => x = root,
                    None => break,
                }
            }
        }

        self.set_color(Some(x), Color::Black);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::manual_assert, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::format;
    use alloc::string::String;
    use compare::{Natural, natural};
    use proptest::prelude::*;

    fn cmp() -> Natural<i32> {
        natural()
    }

    impl<K: Ord, V> RawOSRBTreeMap<K, V> {
        /// Checks ordering, coloring, black-height, weights, parent links and length.
        /// Panics with every violation found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            match self.root {
                None => {
                    if self.nodes.len() != 0 || self.values.len() != 0 {
                        errors.push(format!(
                            "empty tree still holds {} nodes and {} values",
                            self.nodes.len(),
                            self.values.len()
                        ));
                    }
                }
                Some(root) => {
                    if self.nodes.get(root).parent().is_some() {
                        errors.push("root has a parent".into());
                    }
                    if self.nodes.get(root).color() != Color::Black {
                        errors.push("root is red".into());
                    }
                    let (weight, _) = self.validate_node(root, None, None, &mut errors);
                    if weight != self.len() || weight != self.nodes.len() || weight != self.values.len() {
                        errors.push(format!(
                            "len mismatch: counted={weight}, len={}, nodes={}, values={}",
                            self.len(),
                            self.nodes.len(),
                            self.values.len()
                        ));
                    }
                }
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns (subtree weight, black height).
        fn validate_node(&self, handle: Handle, lo: Option<&K>, hi: Option<&K>, errors: &mut Vec<String>) -> (usize, usize) {
            let node = self.nodes.get(handle);

            if lo.is_some_and(|lo| node.key() <= lo) || hi.is_some_and(|hi| node.key() >= hi) {
                errors.push(format!("ordering violated at {handle:?}"));
            }

            let mut child_weights = [0usize; 2];
            let mut black_heights = [1usize; 2];
            for (i, side) in [Side::Left, Side::Right].into_iter().enumerate() {
                let Some(child) = node.child(side) else { continue };
                if self.nodes.get(child).parent() != Some(handle) {
                    errors.push(format!("{child:?} does not point back to parent {handle:?}"));
                }
                if node.color() == Color::Red && self.nodes.get(child).color() == Color::Red {
                    errors.push(format!("red {handle:?} has red child {child:?}"));
                }
                let (child_lo, child_hi) = match side {
                    Side::Left => (lo, Some(node.key())),
                    Side::Right => (Some(node.key()), hi),
                };
                (child_weights[i], black_heights[i]) = self.validate_node(child, child_lo, child_hi, errors);
            }

            if black_heights[0] != black_heights[1] {
                errors.push(format!(
                    "black-height mismatch at {handle:?}: left={}, right={}",
                    black_heights[0], black_heights[1]
                ));
            }

            let weight = 1 + child_weights[0] + child_weights[1];
            if node.weight() != weight {
                errors.push(format!("weight mismatch at {handle:?}: stored={}, actual={weight}", node.weight()));
            }

            let own_black = usize::from(node.color() == Color::Black);
            (weight, black_heights[0] + own_black)
        }

        fn keys(&self) -> Vec<&K> {
            let mut keys = Vec::new();
            let mut current = self.first();
            while let Some(handle) = current {
                keys.push(self.key(handle));
                current = self.successor(handle);
            }
            keys
        }
    }

    fn tree_of(keys: &[i32]) -> RawOSRBTreeMap<i32, i32> {
        let mut tree = RawOSRBTreeMap::new();
        for &key in keys {
            tree.insert(&cmp(), key, key * 10);
        }
        tree
    }

    #[test]
    fn empty_tree() {
        let tree: RawOSRBTreeMap<i32, i32> = RawOSRBTreeMap::new();
        tree.validate_invariants();
        assert_eq!(tree.len(), 0);
        assert!(tree.first().is_none());
        assert!(tree.select(0).is_none());
        assert!(tree.ceiling(&cmp(), &0, true).is_none());
        assert_eq!(tree.count_before(&cmp(), &0, true), 0);
    }

    #[test]
    fn select_and_rank_scenario() {
        let mut tree = tree_of(&[5, 3, 8, 1, 4, 7, 9, 2, 6]);
        tree.validate_invariants();

        assert_eq!(tree.len(), 9);
        assert_eq!(*tree.key(tree.select(0).unwrap()), 1);
        assert_eq!(*tree.key(tree.select(8).unwrap()), 9);
        assert!(tree.select(9).is_none());
        assert_eq!(tree.rank_of_node(tree.find(&cmp(), &7).unwrap()), 6);

        assert_eq!(tree.remove(&cmp(), &5), Some((5, 50)));
        tree.validate_invariants();
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.rank_of_node(tree.find(&cmp(), &7).unwrap()), 5);
    }

    #[test]
    fn replacing_a_value_is_not_structural() {
        let mut tree = tree_of(&[1, 2, 3]);
        let before = tree.mod_count();
        let (_, old) = tree.insert(&cmp(), 2, 99);
        assert_eq!(old, Some(20));
        assert_eq!(tree.mod_count(), before);
        assert_eq!(*tree.value(tree.find(&cmp(), &2).unwrap()), 99);
    }

    #[test]
    fn navigation_matches_definitions() {
        let tree = tree_of(&[10, 20, 30, 40]);
        let key_at = |h: Option<Handle>| h.map(|h| *tree.key(h));

        assert_eq!(key_at(tree.ceiling(&cmp(), &20, true)), Some(20));
        assert_eq!(key_at(tree.ceiling(&cmp(), &20, false)), Some(30));
        assert_eq!(key_at(tree.ceiling(&cmp(), &25, true)), Some(30));
        assert_eq!(key_at(tree.ceiling(&cmp(), &40, false)), None);
        assert_eq!(key_at(tree.ceiling(&cmp(), &0, false)), Some(10));

        assert_eq!(key_at(tree.floor(&cmp(), &20, true)), Some(20));
        assert_eq!(key_at(tree.floor(&cmp(), &20, false)), Some(10));
        assert_eq!(key_at(tree.floor(&cmp(), &25, false)), Some(20));
        assert_eq!(key_at(tree.floor(&cmp(), &10, false)), None);
        assert_eq!(key_at(tree.floor(&cmp(), &99, true)), Some(40));

        assert_eq!(tree.count_before(&cmp(), &20, false), 1);
        assert_eq!(tree.count_before(&cmp(), &20, true), 2);
        assert_eq!(tree.count_before(&cmp(), &99, true), 4);
    }

    #[test]
    fn explicit_rotations_keep_weights_exact() {
        let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
        let root = tree.root().unwrap();
        tree.rotate(root, Side::Left);
        let keys: Vec<i32> = tree.keys().into_iter().copied().collect();
        assert_eq!(keys, [1, 2, 3, 4, 5, 6, 7]);
        for i in 0..7 {
            assert_eq!(tree.rank_of_node(tree.select(i).unwrap()), i);
        }
        let root = tree.root().unwrap();
        tree.rotate(root, Side::Right);
        assert_eq!(tree.weight_of(tree.root()), 7);
        for i in 0..7 {
            assert_eq!(*tree.key(tree.select(i).unwrap()), i as i32 + 1);
        }
    }

    #[test]
    fn remove_and_advance_skips_nothing() {
        for skip in 0..15 {
            let mut tree = tree_of(&(0..15).collect::<Vec<_>>());
            let target = tree.find(&cmp(), &skip).unwrap();
            let ((key, _), next) = tree.remove_and_advance(target, Side::Right);
            assert_eq!(key, skip);
            assert_eq!(next.map(|h| *tree.key(h)), (skip < 14).then_some(skip + 1));
            tree.validate_invariants();
        }
    }

    #[test]
    fn drain_yields_ascending_and_empties() {
        let mut tree = tree_of(&[3, 1, 2]);
        assert_eq!(tree.drain_to_vec(), [(1, 10), (2, 20), (3, 30)]);
        assert!(tree.is_empty());
        tree.validate_invariants();
    }

    #[test]
    fn clear_bumps_mod_count() {
        let mut tree = tree_of(&[1]);
        let before = tree.mod_count();
        tree.clear();
        assert_ne!(tree.mod_count(), before);
        tree.validate_invariants();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = RawOSRBTreeMap::new();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        let (_, old) = tree.insert(&cmp(), key, key);
                        prop_assert_eq!(old, model.insert(key, key));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&cmp(), &key).map(|(_, v)| v), model.remove(&key));
                    }
                }
                tree.validate_invariants();
            }

            let keys: Vec<i32> = tree.keys().into_iter().copied().collect();
            let expected: Vec<i32> = model.keys().copied().collect();
            prop_assert_eq!(keys, expected);
        }

        #[test]
        fn select_and_rank_are_inverse(keys in prop::collection::btree_set(-500i32..500, 1..200)) {
            let tree = tree_of(&keys.iter().copied().collect::<Vec<_>>());
            for (i, key) in keys.iter().enumerate() {
                let handle = tree.select(i).unwrap();
                prop_assert_eq!(tree.key(handle), key);
                prop_assert_eq!(tree.rank_of_node(handle), i);
                prop_assert_eq!(tree.count_before(&cmp(), key, false), i);
            }
        }

        #[test]
        fn root_rank_matches_weight_shortcut(keys in prop::collection::vec(-500i32..500, 1..200)) {
            let tree = tree_of(&keys);
            let root = tree.root().unwrap();
            let right = tree.node(root).right();
            prop_assert_eq!(tree.rank_of_node(root), tree.weight_of(Some(root)) - tree.weight_of(right) - 1);
        }

        #[test]
        fn remove_then_reinsert_restores_content(keys in prop::collection::btree_set(0i32..300, 1..100), pick in any::<usize>()) {
            let keys: Vec<i32> = keys.into_iter().collect();
            let mut tree = tree_of(&keys);
            let victim = keys[pick % keys.len()];

            let (key, value) = tree.remove(&cmp(), &victim).unwrap();
            tree.validate_invariants();
            tree.insert(&cmp(), key, value);
            tree.validate_invariants();

            let after: Vec<i32> = tree.keys().into_iter().copied().collect();
            prop_assert_eq!(after, keys);
        }
    }
}
