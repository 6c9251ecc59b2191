#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod config;

pub mod error;

/// The linear-probing table engine shared by every map.
///
/// The engine does not hash keys itself; [`IntMap`] and [`ObjectMap`] wrap
/// it with their own hashing and equality.
pub mod hash_table;

/// Deterministic hashing for integer-like keys.
pub mod hasher;

/// A map from `i32` keys with the zero key held outside the table.
pub mod int_map;

/// A map for any `Hash + Eq` key type with a configurable hasher builder.
pub mod object_map;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`ObjectMap`] when none is named.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`ObjectMap`] when none is named.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// The hasher builder used by [`ObjectMap`] when none is named.
        ///
        /// Without `foldhash` or `std` there is no source of randomness, so
        /// this falls back to the deterministic [`hasher::BuildFibHasher`].
        pub type DefaultHashBuilder = hasher::BuildFibHasher;
    }
}

pub use error::Error;
pub use error::Result;
pub use hash_table::HashTable;
pub use int_map::IntMap;
pub use object_map::Entry;
pub use object_map::ObjectMap;
