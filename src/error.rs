//! Error types for map operations that can fail without panicking.

use thiserror::Error;

/// Result type for fallible map operations.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by order-statistic queries, cursors, range views and the bulk loader.
///
/// None of these leave the map in a modified state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A rank was at or past the number of entries.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The key is not present.
    #[error("key not found")]
    KeyNotFound,

    /// The map was structurally modified after the cursor last synchronized with it.
    #[error("map was modified outside of this cursor")]
    ConcurrentModification,

    /// `remove` was called on a cursor with no element to remove.
    #[error("cursor has no current element")]
    IllegalState,

    /// A key or bound lies outside the enclosing range.
    #[error("key out of range")]
    KeyOutOfRange,

    /// The start of a range lies after its end.
    #[error("range start is greater than range end")]
    InvalidRange,

    /// A bulk-load source ended before yielding the declared number of entries.
    #[error("sorted source exhausted after {actual} of {expected} entries")]
    SourceExhausted { expected: usize, actual: usize },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_carry_their_fields() {
        assert_eq!(
            Error::IndexOutOfRange { index: 9, len: 3 }.to_string(),
            "index 9 out of range for length 3"
        );
        assert_eq!(
            Error::SourceExhausted { expected: 5, actual: 2 }.to_string(),
            "sorted source exhausted after 2 of 5 entries"
        );
    }
}
