use core::iter::FusedIterator;

use alloc::vec::Vec;
use compare::Natural;

use crate::{NodeIndex, Redwood};

/// In-order iterator over the keys of a [`Redwood`].
pub struct Iter<'a, K, C = Natural<K>> {
    tree: &'a Redwood<K, C>,
    curr: NodeIndex,
    stack: Vec<NodeIndex>,
    remaining: usize,
}

impl<'a, K, C> Iter<'a, K, C> {
    pub(crate) fn new(tree: &'a Redwood<K, C>) -> Self {
        Self {
            tree,
            curr: tree.root(),
            stack: Vec::new(),
            remaining: tree.len(),
        }
    }
}

impl<'a, K, C> Iterator for Iter<'a, K, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while self.curr != Redwood::<K, C>::BLACK_NIL {
            self.stack.push(self.curr);
            self.curr = self.tree.get_node_by_idx(self.curr).left_child();
        }

        if let Some(node) = self.stack.pop() {
            self.curr = self.tree.get_node_by_idx(node).right_child();
            self.remaining -= 1;

            return Some(self.tree.get_node_by_idx(node).key());
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, C> ExactSizeIterator for Iter<'_, K, C> {}

impl<K, C> FusedIterator for Iter<'_, K, C> {}
