//! An order-statistic red-black tree map for Rust.
//!
//! This crate provides [`OSRBTreeMap`], a sorted map whose API mirrors the standard library's
//! `BTreeMap`, extended with O(log n) order-statistic queries and navigable, bounded views:
//!
//! - [`select`](OSRBTreeMap::select) - Get the key at a given sorted position
//! - [`rank`](OSRBTreeMap::rank) - Get the sorted position of a present key
//! - [`floor`](OSRBTreeMap::floor), [`ceiling`](OSRBTreeMap::ceiling),
//!   [`lower`](OSRBTreeMap::lower) and [`higher`](OSRBTreeMap::higher) - Nearest-key navigation
//! - [`range_view`](OSRBTreeMap::range_view) - Bounded, nestable, ascending or descending views
//! - [`cursor`](OSRBTreeMap::cursor) - A fail-fast cursor that can remove while walking
//! - [`from_sorted`](OSRBTreeMap::from_sorted) - Linear-time construction from sorted input
//!
//! # Example
//!
//! ```
//! use osrb_tree::{OSRBTreeMap, Rank};
//!
//! let mut scores = OSRBTreeMap::new();
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//! scores.insert("Carol", 92);
//! scores.insert("Dave", 77);
//!
//! // Standard BTreeMap operations work as expected
//! assert_eq!(scores.get(&"Bob"), Some(&85));
//! assert_eq!(scores.len(), 4);
//!
//! // Order-statistic operations (O(log n))
//! assert_eq!(scores.select(1), Ok(&"Bob"));
//! assert_eq!(scores.rank(&"Carol"), Ok(2));
//! assert_eq!(scores[Rank(0)], 100);
//!
//! // Navigation
//! assert_eq!(scores.ceiling(&"Bz"), Some((&"Carol", &92)));
//! assert_eq!(scores.lower(&"Alice"), None);
//!
//! // Views answer the same questions relative to a key range
//! let view = scores.range_view("B".."D").unwrap();
//! assert_eq!(view.len(), 2);
//! assert_eq!(view.descending().first_key_value(), Some((&"Carol", &92)));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Custom orderings** - Any [`compare::Compare`] implementation, closures included
//! - **O(log n) rank operations** - Every node records the size of its subtree
//! - **Arena storage** - Nodes live in a contiguous arena and link to each other by index
//!
//! # Implementation
//!
//! The map is a red-black tree whose nodes carry a parent link and a subtree weight. Insertion
//! and removal rebalance with the classic recolor-and-rotate fixups, and each rotation repairs the
//! weights of the two nodes it moves. Values are kept in a second arena so that mutable iteration
//! never aliases the links being traversed.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: Mutable iteration reads values through a raw pointer into the value arena.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod order_statistic;
mod raw;

pub mod osrbtree_map;

pub use error::{Error, Result};
pub use order_statistic::Rank;
pub use osrbtree_map::{Cursor, OSRBTreeMap, Orientation, RangeView, RangeViewMut};
