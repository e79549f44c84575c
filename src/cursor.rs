use compare::{Compare, Natural};
use log::debug;

use crate::{NodeIndex, Redwood, RedwoodError, Result};

/// In-order cursor over a [`Redwood`] that can remove the key it last yielded.
///
/// Removing a key with two children moves its successor's key into the removed key's node and
/// frees the successor's node instead. The cursor therefore never keeps a node across a removal:
/// it resumes from the node the removal reports as holding the next larger key.
pub struct Cursor<'a, K, C = Natural<K>> {
    tree: &'a mut Redwood<K, C>,
    current: NodeIndex,
    last_yielded: Option<NodeIndex>,
}

impl<'a, K, C: Compare<K>> Cursor<'a, K, C> {
    pub(crate) fn new(tree: &'a mut Redwood<K, C>) -> Self {
        let current = tree.minimum(tree.root());

        Self {
            tree,
            current,
            last_yielded: None,
        }
    }

    /// Returns `true` while a key remains to be yielded, including when that key is the largest.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current != Redwood::<K, C>::BLACK_NIL
    }

    /// Returns the key the next call to [`Cursor::next`] would yield.
    #[must_use]
    pub fn peek(&self) -> Option<&K> {
        self.tree.key_at(self.current)
    }

    /// Yields the next key in ascending order.
    ///
    /// # Errors
    ///
    /// [`RedwoodError::NoElement`] once every key has been yielded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<&K> {
        if self.current == Redwood::<K, C>::BLACK_NIL {
            return Err(RedwoodError::NoElement);
        }

        let yielded = self.current;
        self.current = self.tree.successor(yielded);
        self.last_yielded = Some(yielded);

        Ok(self.tree.get_node_by_idx(yielded).key())
    }

    /// Removes the key returned by the last call to [`Cursor::next`] and returns it.
    ///
    /// # Errors
    ///
    /// [`RedwoodError::InvalidCursorState`] if nothing was yielded since the cursor was opened or
    /// since the previous removal.
    pub fn remove_current(&mut self) -> Result<K> {
        let yielded = self
            .last_yielded
            .take()
            .ok_or(RedwoodError::InvalidCursorState)?;
        let (key, next) = self
            .tree
            .delete(yielded)
            .ok_or(RedwoodError::InvalidCursorState)?;

        debug!("cursor resumes at {next:?} after removal");
        self.current = next;

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Balancing, Redwood, RedwoodConfig, RedwoodError,
        tests::{check_invariants, init_logging},
    };

    #[test]
    pub fn empty_tree_cursor() {
        let mut tree = Redwood::<i32>::new();
        let mut cursor = tree.cursor();

        assert!(!cursor.has_next());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.next(), Err(RedwoodError::NoElement));
        assert_eq!(cursor.remove_current(), Err(RedwoodError::InvalidCursorState));
    }

    #[test]
    pub fn has_next_on_last_key() {
        let mut tree: Redwood<i32> = [1, 2].into_iter().collect();
        let mut cursor = tree.cursor();

        assert_eq!(cursor.next(), Ok(&1));
        assert!(cursor.has_next());
        assert_eq!(cursor.peek(), Some(&2));
        assert_eq!(cursor.next(), Ok(&2));
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(), Err(RedwoodError::NoElement));
    }

    #[test]
    pub fn remove_some_while_iterating() {
        init_logging();
        let mut tree: Redwood<i32> = [1, 2, 3].into_iter().collect();
        let mut cursor = tree.cursor();

        assert_eq!(cursor.next(), Ok(&1));
        assert_eq!(cursor.remove_current(), Ok(1));
        assert_eq!(cursor.next(), Ok(&2));
        assert_eq!(cursor.next(), Ok(&3));
        assert_eq!(cursor.remove_current(), Ok(3));
        assert!(!cursor.has_next());

        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [2]);
        check_invariants(&tree);
    }

    #[test]
    pub fn double_removal_fails() {
        let mut tree: Redwood<i32> = (0..5).collect();
        let mut cursor = tree.cursor();

        assert_eq!(cursor.remove_current(), Err(RedwoodError::InvalidCursorState));
        assert_eq!(cursor.next(), Ok(&0));
        assert_eq!(cursor.remove_current(), Ok(0));
        assert_eq!(cursor.remove_current(), Err(RedwoodError::InvalidCursorState));
        assert_eq!(cursor.next(), Ok(&1));

        assert_eq!(tree.len(), 4);
    }

    #[test]
    pub fn drain_in_order() {
        init_logging();

        for balancing in [Balancing::RedBlack, Balancing::Unbalanced] {
            let mut tree = Redwood::with_config(RedwoodConfig::new().with_balancing(balancing));
            tree.try_extend([50, 20, 80, 10, 30, 60, 90, 25, 35, 55, 65, 5]).unwrap();

            let mut drained = Vec::new();
            let mut cursor = tree.cursor();
            while cursor.has_next() {
                let key = *cursor.next().unwrap();
                assert_eq!(cursor.remove_current(), Ok(key));
                drained.push(key);
            }

            assert_eq!(drained, [5, 10, 20, 25, 30, 35, 50, 55, 60, 65, 80, 90]);
            assert!(tree.is_empty());
            check_invariants(&tree);
        }
    }

    #[test]
    pub fn remove_keys_with_two_children() {
        let mut tree: Redwood<i32> = (1..=31).collect();
        let root_key = *tree.get_node_by_idx(tree.root()).key();

        let mut visited = Vec::new();
        let mut cursor = tree.cursor();
        while cursor.has_next() {
            let key = *cursor.next().unwrap();
            visited.push(key);
            if key % 4 == 0 || key == root_key {
                cursor.remove_current().unwrap();
            }
        }

        assert_eq!(visited, (1..=31).collect::<Vec<_>>());
        let expected: Vec<i32> = (1..=31)
            .filter(|key| key % 4 != 0 && *key != root_key)
            .collect();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), expected);
        check_invariants(&tree);
    }

    #[quickcheck_macros::quickcheck]
    fn filtered_drain_visits_every_key_once(xs: Vec<u16>, stride: u8) -> bool {
        let stride = u16::from(stride % 5) + 1;
        let mut tree: Redwood<u16> = xs.iter().copied().collect();
        let expected: Vec<u16> = tree.iter().copied().collect();

        let mut visited = Vec::new();
        let mut cursor = tree.cursor();
        while cursor.has_next() {
            let key = *cursor.next().unwrap();
            visited.push(key);
            if key % stride == 0 {
                cursor.remove_current().unwrap();
            }
        }

        check_invariants(&tree);
        visited == expected && tree.iter().all(|key| key % stride != 0)
    }
}
