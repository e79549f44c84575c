use core::fmt;

use alloc::format;

use crate::{NodeColor, NodeIndex, Redwood};

/// Renders the tree shape, one node per line. Left children hang off `├──`, right children off
/// `└──`. Colors are shown for Red-Black trees only.
impl<K: fmt::Display, C> fmt::Display for Redwood<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root() == Self::BLACK_NIL {
            return Ok(());
        }

        self.render_node(f, self.root(), "", "")
    }
}

impl<K: fmt::Display, C> Redwood<K, C> {
    /// `line_prefix` is written before the key, `child_prefix` before the branches below it.
    fn render_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: NodeIndex,
        line_prefix: &str,
        child_prefix: &str,
    ) -> fmt::Result {
        let storage = self.get_node_by_idx(node);

        write!(f, "{line_prefix}{}", storage.key())?;
        if self.config().is_balanced() {
            match storage.color() {
                NodeColor::Red => f.write_str(" (Red)")?,
                NodeColor::Black => f.write_str(" (Black)")?,
            }
        }
        f.write_str("\n")?;

        if storage.left_child() != Self::BLACK_NIL {
            self.render_node(
                f,
                storage.left_child(),
                &format!("{child_prefix}├── "),
                &format!("{child_prefix}│   "),
            )?;
        }
        if storage.right_child() != Self::BLACK_NIL {
            self.render_node(
                f,
                storage.right_child(),
                &format!("{child_prefix}└── "),
                &format!("{child_prefix}    "),
            )?;
        }

        Ok(())
    }
}

impl<K: fmt::Debug, C> fmt::Debug for Redwood<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
