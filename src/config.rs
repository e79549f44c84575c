//! Construction-time settings of a [`Redwood`](crate::Redwood).

/// What `insert` does with a key that compares equal to one already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DuplicatePolicy {
    /// Fail with [`RedwoodError::DuplicateKey`](crate::RedwoodError::DuplicateKey).
    #[default]
    Reject,
    /// Leave the tree untouched and report that nothing was inserted.
    Ignore,
}

/// Shape maintenance performed after structural changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Balancing {
    /// Red-Black rebalancing, height stays within `2 * log2(n + 1)`.
    #[default]
    RedBlack,
    /// Plain binary search tree. Same operations, no fixups, linear worst-case height.
    Unbalanced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RedwoodConfig {
    pub duplicates: DuplicatePolicy,
    pub balancing: Balancing,
}

impl RedwoodConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            duplicates: DuplicatePolicy::Reject,
            balancing: Balancing::RedBlack,
        }
    }

    #[must_use]
    pub const fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    #[must_use]
    pub const fn with_balancing(mut self, balancing: Balancing) -> Self {
        self.balancing = balancing;
        self
    }

    pub(crate) const fn is_balanced(&self) -> bool {
        matches!(self.balancing, Balancing::RedBlack)
    }
}

#[cfg(test)]
mod tests {
    use super::{Balancing, DuplicatePolicy, RedwoodConfig};

    #[test]
    pub fn default_config() {
        let config = RedwoodConfig::default();

        assert_eq!(config, RedwoodConfig::new());
        assert_eq!(config.duplicates, DuplicatePolicy::Reject);
        assert!(config.is_balanced());
    }

    #[test]
    pub fn builder_setters() {
        let config = RedwoodConfig::new()
            .with_duplicates(DuplicatePolicy::Ignore)
            .with_balancing(Balancing::Unbalanced);

        assert_eq!(config.duplicates, DuplicatePolicy::Ignore);
        assert_eq!(config.balancing, Balancing::Unbalanced);
        assert!(!config.is_balanced());
    }
}
