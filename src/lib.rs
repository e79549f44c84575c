//! Ordered collections backed by an arena-allocated Red-Black Tree.
//!
//! [`Redwood`] keeps its keys sorted according to a [`Compare`] implementation, rejects (or
//! ignores, see [`DuplicatePolicy`]) duplicate keys, and exposes a [`Cursor`] that may remove the
//! key it just yielded without losing its place in the traversal.
//!
//! ```
//! use redwood::Redwood;
//!
//! let mut tree = Redwood::new();
//! for key in [5, 2, 8, 1, 6, 3, 7] {
//!     tree.insert(key).unwrap();
//! }
//! tree.remove(&5);
//!
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 6, 7, 8]);
//!
//! let mut cursor = tree.cursor();
//! while cursor.has_next() {
//!     if cursor.next().unwrap() % 2 == 0 {
//!         cursor.remove_current().unwrap();
//!     }
//! }
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 3, 7]);
//! ```

extern crate alloc;

mod config;
mod cursor;
mod display;
mod error;
mod iter;

use core::{cmp::Ordering, mem};

use alloc::vec::Vec;
use compare::{Compare, Natural};
use log::{debug, trace};

pub use config::{Balancing, DuplicatePolicy, RedwoodConfig};
pub use cursor::Cursor;
pub use error::{RedwoodError, Result};
pub use iter::Iter;

/*
Slot 0 of the storage is the black sentinel standing in for every absent child and for the
parent of the root. It is never written to after construction, so fixups that read the color of
an absent child always see `Black`.

Vacant slots form a linked list threaded through their `parent` field, headed by `free_head`:
- allocating pops the head, new head is `storage[head].parent`
- freeing sets `storage[cell].parent = head`, then `head = cell`
*/

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum NodeColor {
    #[default]
    Red,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NodeIndex(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct RedwoodNode<K> {
    key: Option<K>,
    color: NodeColor,
    parent: NodeIndex,
    left: NodeIndex,
    right: NodeIndex,
}

impl<K> RedwoodNode<K> {
    const fn sentinel() -> Self {
        Self {
            key: None,
            color: NodeColor::Black,
            parent: NodeIndex(0),
            left: NodeIndex(0),
            right: NodeIndex(0),
        }
    }

    fn new_isolated(key: K, parent: NodeIndex) -> Self {
        Self {
            key: Some(key),
            color: NodeColor::default(),
            parent,
            left: NodeIndex(0),
            right: NodeIndex(0),
        }
    }

    pub(crate) fn key(&self) -> &K {
        self.key
            .as_ref()
            .expect("`RedwoodNode::key()` - node is not linked into the tree")
    }

    pub(crate) const fn left_child(&self) -> NodeIndex {
        self.left
    }

    pub(crate) const fn right_child(&self) -> NodeIndex {
        self.right
    }

    pub(crate) const fn color(&self) -> NodeColor {
        self.color
    }
}

/// An ordered set of keys stored in a Red-Black Tree.
///
/// Nodes live in a single vector and refer to each other by index. Removing a key may move the
/// key of another node into the removed key's slot, so indices are never handed out: callers
/// reason about keys only.
pub struct Redwood<K, C = Natural<K>> {
    storage: Vec<RedwoodNode<K>>,
    root: NodeIndex,
    free_head: NodeIndex,
    len: usize,
    cmp: C,
    config: RedwoodConfig,
}

impl<K: Ord> Redwood<K> {
    /// Creates an empty tree ordered by the natural order of its keys.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cmp(compare::natural())
    }

    #[must_use]
    pub fn with_config(config: RedwoodConfig) -> Self {
        Self::with_cmp_and_config(compare::natural(), config)
    }
}

impl<K: Ord> Default for Redwood<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> Redwood<K, C> {
    pub(crate) const BLACK_NIL: NodeIndex = NodeIndex(0);

    /// Creates an empty tree ordered by `cmp`.
    ///
    /// ```
    /// use redwood::Redwood;
    ///
    /// let mut tree = Redwood::with_cmp(|a: &i32, b: &i32| b.cmp(a));
    /// tree.try_extend([1, 3, 2]).unwrap();
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_cmp(cmp: C) -> Self {
        Self::with_cmp_and_config(cmp, RedwoodConfig::default())
    }

    pub fn with_cmp_and_config(cmp: C, config: RedwoodConfig) -> Self {
        Self {
            storage: alloc::vec![RedwoodNode::sentinel()],
            root: Self::BLACK_NIL,
            free_head: Self::BLACK_NIL,
            len: 0,
            cmp,
            config,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn config(&self) -> &RedwoodConfig {
        &self.config
    }

    /// Returns a reference to the tree's comparator.
    #[must_use]
    pub const fn cmp(&self) -> &C {
        &self.cmp
    }

    /// Reserves room for at least `additional` more keys without reallocating.
    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    pub fn clear(&mut self) {
        self.storage.truncate(1);
        self.root = Self::BLACK_NIL;
        self.free_head = Self::BLACK_NIL;
        self.len = 0;
    }

    /// Iterates over the keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K, C> {
        Iter::new(self)
    }

    /// Returns the smallest key.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        self.key_at(self.minimum(self.root))
    }

    /// Returns the largest key.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        self.key_at(self.maximum(self.root))
    }

    pub(crate) fn get_node_by_idx(&self, node_idx: NodeIndex) -> &RedwoodNode<K> {
        &self.storage[node_idx.0]
    }

    pub(crate) fn get_node_by_idx_mut(&mut self, node_idx: NodeIndex) -> &mut RedwoodNode<K> {
        &mut self.storage[node_idx.0]
    }

    pub(crate) const fn root(&self) -> NodeIndex {
        self.root
    }

    pub(crate) fn key_at(&self, node: NodeIndex) -> Option<&K> {
        if node == Self::BLACK_NIL {
            None
        } else {
            Some(self.get_node_by_idx(node).key())
        }
    }

    fn parent_of(&self, node: NodeIndex) -> NodeIndex {
        self.get_node_by_idx(node).parent
    }

    fn left_of(&self, node: NodeIndex) -> NodeIndex {
        self.get_node_by_idx(node).left
    }

    fn right_of(&self, node: NodeIndex) -> NodeIndex {
        self.get_node_by_idx(node).right
    }

    fn color_of(&self, node: NodeIndex) -> NodeColor {
        self.get_node_by_idx(node).color
    }

    fn is_red(&self, node: NodeIndex) -> bool {
        matches!(self.color_of(node), NodeColor::Red)
    }

    // The sentinel stays black.
    fn set_color(&mut self, node: NodeIndex, color: NodeColor) {
        if node != Self::BLACK_NIL {
            self.get_node_by_idx_mut(node).color = color;
        }
    }

    pub(crate) fn minimum(&self, subtree: NodeIndex) -> NodeIndex {
        let mut current_node = subtree;

        if current_node == Self::BLACK_NIL {
            return Self::BLACK_NIL;
        }

        while self.left_of(current_node) != Self::BLACK_NIL {
            current_node = self.left_of(current_node);
        }

        current_node
    }

    pub(crate) fn maximum(&self, subtree: NodeIndex) -> NodeIndex {
        let mut current_node = subtree;

        if current_node == Self::BLACK_NIL {
            return Self::BLACK_NIL;
        }

        while self.right_of(current_node) != Self::BLACK_NIL {
            current_node = self.right_of(current_node);
        }

        current_node
    }

    /// Returns the node holding the next larger key, or the sentinel after the maximum.
    pub(crate) fn successor(&self, node: NodeIndex) -> NodeIndex {
        let right = self.right_of(node);
        if right != Self::BLACK_NIL {
            return self.minimum(right);
        }

        let mut current_node = node;
        let mut parent_node = self.parent_of(node);

        while parent_node != Self::BLACK_NIL && current_node == self.right_of(parent_node) {
            current_node = parent_node;
            parent_node = self.parent_of(parent_node);
        }

        parent_node
    }

    fn alloc_node(&mut self, node: RedwoodNode<K>) -> NodeIndex {
        if self.free_head == Self::BLACK_NIL {
            self.storage.push(node);
            return NodeIndex(self.storage.len() - 1);
        }

        let node_idx = self.free_head;
        self.free_head = self.parent_of(node_idx);
        *self.get_node_by_idx_mut(node_idx) = node;

        node_idx
    }

    /// Unlinked nodes only. Returns the key the slot was holding.
    fn free_node(&mut self, node_idx: NodeIndex) -> Option<K> {
        let free_head = self.free_head;
        let node = self.get_node_by_idx_mut(node_idx);

        node.parent = free_head;
        node.left = Self::BLACK_NIL;
        node.right = Self::BLACK_NIL;
        let key = node.key.take();

        self.free_head = node_idx;

        key
    }

    fn rotate_left(&mut self, center: NodeIndex) {
        trace!("rotating left at {center:?}");

        let grandparent_idx = self.parent_of(center);
        let sibling_idx = self.right_of(center);

        let c_idx = self.left_of(sibling_idx);

        self.get_node_by_idx_mut(center).right = c_idx;
        if c_idx != Self::BLACK_NIL {
            self.get_node_by_idx_mut(c_idx).parent = center;
        }

        self.get_node_by_idx_mut(sibling_idx).left = center;
        self.get_node_by_idx_mut(center).parent = sibling_idx;
        self.get_node_by_idx_mut(sibling_idx).parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, sibling_idx);
    }

    fn rotate_right(&mut self, center: NodeIndex) {
        trace!("rotating right at {center:?}");

        let grandparent_idx = self.parent_of(center);
        let sibling_idx = self.left_of(center);

        let c_idx = self.right_of(sibling_idx);

        self.get_node_by_idx_mut(center).left = c_idx;
        if c_idx != Self::BLACK_NIL {
            self.get_node_by_idx_mut(c_idx).parent = center;
        }

        self.get_node_by_idx_mut(sibling_idx).right = center;
        self.get_node_by_idx_mut(center).parent = sibling_idx;
        self.get_node_by_idx_mut(sibling_idx).parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, sibling_idx);
    }

    /// Points the slot of `parent` that held `old` at `new`, or the root when `parent` is the
    /// sentinel.
    fn replace_child(&mut self, parent: NodeIndex, old: NodeIndex, new: NodeIndex) {
        if parent == Self::BLACK_NIL {
            self.root = new;
        } else if self.left_of(parent) == old {
            self.get_node_by_idx_mut(parent).left = new;
        } else {
            self.get_node_by_idx_mut(parent).right = new;
        }
    }

    fn fix_red_violation(&mut self, start_node_idx: NodeIndex) {
        let mut curr_node = start_node_idx;

        while self.is_red(self.parent_of(curr_node)) {
            // A red parent is never the root, so the grandparent is a real node.
            let parent_idx = self.parent_of(curr_node);
            let grandparent_idx = self.parent_of(parent_idx);
            let grandparent = self.get_node_by_idx(grandparent_idx);

            let parent_is_right_child = grandparent.right == parent_idx;
            let uncle = if parent_is_right_child {
                grandparent.left
            } else {
                grandparent.right
            };

            if self.is_red(uncle) {
                trace!("insert fixup: red uncle at {uncle:?}, recoloring");
                self.set_color(parent_idx, NodeColor::Black);
                self.set_color(uncle, NodeColor::Black);
                self.set_color(grandparent_idx, NodeColor::Red);

                curr_node = grandparent_idx;
                continue;
            }

            let parent = self.get_node_by_idx(parent_idx);
            if (parent_is_right_child && parent.left == curr_node)
                || (!parent_is_right_child && parent.right == curr_node)
            {
                trace!("insert fixup: inner child at {curr_node:?}");
                if parent_is_right_child {
                    self.rotate_right(parent_idx);
                } else {
                    self.rotate_left(parent_idx);
                }

                curr_node = parent_idx;
                continue;
            }

            trace!("insert fixup: outer child at {curr_node:?}");
            self.set_color(parent_idx, NodeColor::Black);
            self.set_color(grandparent_idx, NodeColor::Red);

            if parent_is_right_child {
                self.rotate_left(grandparent_idx);
            } else {
                self.rotate_right(grandparent_idx);
            }
        }

        let root = self.root;
        self.set_color(root, NodeColor::Black);
    }

    /// `node` carries an extra black. `parent` is tracked separately because `node` may be the
    /// sentinel, whose links are never written.
    fn fix_double_black(&mut self, start_node_idx: NodeIndex, start_parent_idx: NodeIndex) {
        let mut curr_node = start_node_idx;
        let mut parent_idx = start_parent_idx;

        while curr_node != self.root && !self.is_red(curr_node) {
            let node_is_left_child = self.left_of(parent_idx) == curr_node;
            let mut sibling_idx = if node_is_left_child {
                self.right_of(parent_idx)
            } else {
                self.left_of(parent_idx)
            };

            if self.is_red(sibling_idx) {
                trace!("delete fixup: red sibling at {sibling_idx:?}");
                self.set_color(sibling_idx, NodeColor::Black);
                self.set_color(parent_idx, NodeColor::Red);

                if node_is_left_child {
                    self.rotate_left(parent_idx);
                    sibling_idx = self.right_of(parent_idx);
                } else {
                    self.rotate_right(parent_idx);
                    sibling_idx = self.left_of(parent_idx);
                }
            }

            let (near_idx, far_idx) = if node_is_left_child {
                (self.left_of(sibling_idx), self.right_of(sibling_idx))
            } else {
                (self.right_of(sibling_idx), self.left_of(sibling_idx))
            };

            if !self.is_red(near_idx) && !self.is_red(far_idx) {
                trace!("delete fixup: black nephews, moving up from {curr_node:?}");
                self.set_color(sibling_idx, NodeColor::Red);

                curr_node = parent_idx;
                parent_idx = self.parent_of(curr_node);
                continue;
            }

            if !self.is_red(far_idx) {
                trace!("delete fixup: red near nephew at {near_idx:?}");
                self.set_color(near_idx, NodeColor::Black);
                self.set_color(sibling_idx, NodeColor::Red);

                if node_is_left_child {
                    self.rotate_right(sibling_idx);
                    sibling_idx = self.right_of(parent_idx);
                } else {
                    self.rotate_left(sibling_idx);
                    sibling_idx = self.left_of(parent_idx);
                }
            }

            trace!("delete fixup: red far nephew, rotating at {parent_idx:?}");
            let far_idx = if node_is_left_child {
                self.right_of(sibling_idx)
            } else {
                self.left_of(sibling_idx)
            };
            self.set_color(sibling_idx, self.color_of(parent_idx));
            self.set_color(parent_idx, NodeColor::Black);
            self.set_color(far_idx, NodeColor::Black);

            if node_is_left_child {
                self.rotate_left(parent_idx);
            } else {
                self.rotate_right(parent_idx);
            }

            curr_node = self.root;
        }

        self.set_color(curr_node, NodeColor::Black);
    }
}

impl<K, C: Compare<K>> Redwood<K, C> {
    pub(crate) fn search<Q: ?Sized>(&self, key: &Q) -> NodeIndex
    where
        C: Compare<Q, K>,
    {
        let mut current_node = self.root;

        while current_node != Self::BLACK_NIL {
            let curr_node_storage = self.get_node_by_idx(current_node);

            match self.cmp.compare(key, curr_node_storage.key()) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return current_node;
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                }
            }
        }

        Self::BLACK_NIL
    }

    pub fn contains<Q: ?Sized>(&self, key: &Q) -> bool
    where
        C: Compare<Q, K>,
    {
        self.search(key) != Self::BLACK_NIL
    }

    /// Returns the stored key comparing equal to `key`.
    pub fn get<Q: ?Sized>(&self, key: &Q) -> Option<&K>
    where
        C: Compare<Q, K>,
    {
        self.key_at(self.search(key))
    }

    /// Returns the key following `key` in the tree's order, provided `key` itself is stored.
    pub fn successor_of<Q: ?Sized>(&self, key: &Q) -> Option<&K>
    where
        C: Compare<Q, K>,
    {
        let node = self.search(key);
        if node == Self::BLACK_NIL {
            return None;
        }

        self.key_at(self.successor(node))
    }

    /// Inserts `key`.
    ///
    /// Returns `Ok(true)` when the key was added. A key already present yields
    /// [`RedwoodError::DuplicateKey`] under [`DuplicatePolicy::Reject`] and `Ok(false)` under
    /// [`DuplicatePolicy::Ignore`]; in both cases the tree is unchanged.
    pub fn insert(&mut self, key: K) -> Result<bool> {
        let mut current_node = self.root;
        let mut parent_node = Self::BLACK_NIL;
        let mut is_left_child = false;

        while current_node != Self::BLACK_NIL {
            parent_node = current_node;
            let curr_node_storage = self.get_node_by_idx(current_node);

            match self.cmp.compare(&key, curr_node_storage.key()) {
                Ordering::Less => {
                    current_node = curr_node_storage.left;
                    is_left_child = true;
                }
                Ordering::Greater => {
                    current_node = curr_node_storage.right;
                    is_left_child = false;
                }
                Ordering::Equal => return self.on_duplicate(current_node),
            }
        }

        let new_node_pos = self.alloc_node(RedwoodNode::new_isolated(key, parent_node));

        if parent_node == Self::BLACK_NIL {
            self.root = new_node_pos;
        } else if is_left_child {
            self.get_node_by_idx_mut(parent_node).left = new_node_pos;
        } else {
            self.get_node_by_idx_mut(parent_node).right = new_node_pos;
        }
        self.len += 1;

        if self.config.is_balanced() {
            self.fix_red_violation(new_node_pos);
        }

        Ok(true)
    }

    fn on_duplicate(&self, existing: NodeIndex) -> Result<bool> {
        match self.config.duplicates {
            DuplicatePolicy::Reject => {
                debug!("rejecting key equal to node {existing:?}");
                Err(RedwoodError::DuplicateKey)
            }
            DuplicatePolicy::Ignore => {
                debug!("ignoring key equal to node {existing:?}");
                Ok(false)
            }
        }
    }

    /// Removes the key comparing equal to `key` and returns it.
    pub fn remove<Q: ?Sized>(&mut self, key: &Q) -> Option<K>
    where
        C: Compare<Q, K>,
    {
        let node = self.search(key);
        if node == Self::BLACK_NIL {
            return None;
        }

        self.delete(node).map(|(removed, _)| removed)
    }

    /// Removes the key held by `handle`, returning it together with the node that now holds the
    /// next larger key (the sentinel if there is none).
    ///
    /// The node is looked up again by key, so a handle taken before an earlier structural change
    /// still removes the right key as long as its slot holds one.
    pub(crate) fn delete(&mut self, handle: NodeIndex) -> Option<(K, NodeIndex)> {
        let target = {
            let key = self.storage.get(handle.0)?.key.as_ref()?;
            self.search(key)
        };
        if target == Self::BLACK_NIL {
            return None;
        }

        let spliced = if self.left_of(target) == Self::BLACK_NIL
            || self.right_of(target) == Self::BLACK_NIL
        {
            target
        } else {
            self.successor(target)
        };

        // With two children the successor's key moves into `target`, which then is the successor.
        let next = if spliced == target {
            self.successor(target)
        } else {
            target
        };

        let child = if self.left_of(spliced) != Self::BLACK_NIL {
            self.left_of(spliced)
        } else {
            self.right_of(spliced)
        };
        let child_parent = self.parent_of(spliced);

        if child != Self::BLACK_NIL {
            self.get_node_by_idx_mut(child).parent = child_parent;
        }
        self.replace_child(child_parent, spliced, child);

        let spliced_color = self.color_of(spliced);
        let moved_key = self.free_node(spliced);
        let removed_key = if spliced == target {
            moved_key
        } else {
            mem::replace(&mut self.get_node_by_idx_mut(target).key, moved_key)
        };

        if self.config.is_balanced() && matches!(spliced_color, NodeColor::Black) {
            self.fix_double_black(child, child_parent);
        }
        self.len -= 1;

        debug!("removed key at {target:?}, unlinked {spliced:?}, successor at {next:?}");

        Some((
            removed_key.expect("`Redwood::delete()` - linked node has no key"),
            next,
        ))
    }

    /// Opens a [`Cursor`] positioned before the smallest key.
    pub fn cursor(&mut self) -> Cursor<'_, K, C> {
        Cursor::new(self)
    }

    /// Inserts every key of `keys` in order, stopping at the first one `insert` rejects.
    pub fn try_extend<I: IntoIterator<Item = K>>(&mut self, keys: I) -> Result<()> {
        for key in keys {
            self.insert(key)?;
        }

        Ok(())
    }
}

/// Keys already present are dropped, whatever the duplicate policy. Use
/// [`Redwood::try_extend`] to have a duplicate reported as [`RedwoodError::DuplicateKey`].
impl<K, C: Compare<K>> Extend<K> for Redwood<K, C> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            if let Err(err) = self.insert(key) {
                debug!("extend skipped a key: {err}");
            }
        }
    }
}

impl<K: Ord> FromIterator<K> for Redwood<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);

        tree
    }
}

impl<'a, K, C> IntoIterator for &'a Redwood<K, C> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
