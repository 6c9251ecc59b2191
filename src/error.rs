//! Error types for map construction, sizing, and cursor misuse.
//!
//! Looking up or removing a missing key is not an error: those operations
//! return `Option`.

use thiserror::Error;

/// Result type alias for fallible map operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the maps in this crate.
///
/// Every fallible operation validates its arguments before touching the
/// table, so an `Err` always leaves the map exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// The load factor was not in the open interval `(0, 1)`.
    #[error("load factor must be > 0 and < 1: {0}")]
    InvalidLoadFactor(f32),

    /// The requested capacity needs a table larger than
    /// [`MAX_TABLE_SIZE`](crate::config::MAX_TABLE_SIZE) slots.
    #[error("the required capacity is too large: {0}")]
    CapacityTooLarge(usize),

    /// A cursor was asked to remove an entry before `next` produced one, or
    /// twice for the same entry.
    #[error("next must be called before remove")]
    NoCurrentEntry,
}

impl Error {
    /// Returns `true` for errors caused by a bad argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidLoadFactor(_) | Error::CapacityTooLarge(_))
    }

    /// Returns `true` for errors caused by calling an operation in the wrong
    /// state.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Error::NoCurrentEntry)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn classification() {
        assert!(Error::InvalidLoadFactor(1.5).is_invalid_argument());
        assert!(Error::CapacityTooLarge(usize::MAX).is_invalid_argument());
        assert!(!Error::NoCurrentEntry.is_invalid_argument());
        assert!(Error::NoCurrentEntry.is_illegal_state());
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::InvalidLoadFactor(0.0).to_string(),
            "load factor must be > 0 and < 1: 0"
        );
        assert_eq!(
            Error::CapacityTooLarge(7).to_string(),
            "the required capacity is too large: 7"
        );
        assert_eq!(
            Error::NoCurrentEntry.to_string(),
            "next must be called before remove"
        );
    }
}
