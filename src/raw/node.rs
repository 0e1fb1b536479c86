use super::handle::Handle;

/// Red-black node color.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A red-black tree node.
///
/// Keys live in the node; values live in a separate arena and are referenced by handle so that
/// mutable value iteration never aliases the link fields being traversed.
pub(crate) struct Node<K> {
    key: K,
    value: Handle,
    left: Option<Handle>,
    right: Option<Handle>,
    // Non-owning back reference, used only for traversal and rebalancing.
    parent: Option<Handle>,
    color: Color,
    // Number of nodes in the subtree rooted here, this node included.
    weight: usize,
}

impl<K> Node<K> {
    /// Creates a detached node of the given color with a weight of one.
    pub(crate) fn new(key: K, value: Handle, parent: Option<Handle>, color: Color) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            color,
            weight: 1,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub(crate) fn value(&self) -> Handle {
        self.value
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub(crate) fn weight(&self) -> usize {
        self.weight
    }

    /// Returns true if both children are present.
    #[inline]
    pub(crate) fn has_two_children(&self) -> bool {
        self.left.is_some() && self.right.is_some()
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    pub(crate) fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub(crate) fn set_weight(&mut self, weight: usize) {
        self.weight = weight;
    }

    /// Exchanges the key and value handle with `other`, leaving links, color and weight alone.
    pub(crate) fn swap_payload(&mut self, other: &mut Self) {
        core::mem::swap(&mut self.key, &mut other.key);
        core::mem::swap(&mut self.value, &mut other.value);
    }

    /// Consumes the node, returning its key and value handle.
    pub(crate) fn into_payload(self) -> (K, Handle) {
        (self.key, self.value)
    }
}
