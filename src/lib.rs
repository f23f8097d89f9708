//! An in-memory, arena-backed 2D R-tree with Guttman splitting and kNN
//! search.
//!
//! Entries are axis-aligned rectangles carrying an integer id. The mutable
//! [`rtree::RTree`] supports insertion, deletion and five query operations;
//! [`rtree::RTree::to_index`] freezes it into a compact, immutable
//! [`index::FrozenIndex`] sharing the same query logic through the
//! [`traversal`] module.

pub mod exceptions;
pub mod geometry;
pub mod index;
pub mod node;
pub mod primitive_array;
pub mod priority_queue;
pub mod rtree;
#[cfg(feature = "setup_tracing")]
mod settings;
pub mod traversal;
pub mod wire;
