use thiserror::Error;

/// Errors raised by [`Redwood`](crate::Redwood) and its [`Cursor`](crate::Cursor).
///
/// Every variant is a misuse of the API reported at the offending call. None of them leave the
/// tree in a modified state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RedwoodError {
    /// The cursor was advanced past the largest key, or opened on an empty tree.
    #[error("cursor has no element left to yield")]
    NoElement,
    /// `remove_current` was called without a key yielded since the last removal.
    #[error("cursor has no yielded element to remove")]
    InvalidCursorState,
    /// The key is already present and the tree rejects duplicates.
    #[error("key is already present in the tree")]
    DuplicateKey,
}

pub type Result<T> = core::result::Result<T, RedwoodError>;
