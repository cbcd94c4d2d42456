//! Compact octrees for point cloud display.
//!
//! An [`Octree`](crate::Octree) stores a point cloud as a bit-packed tree. Every internal
//! [`OctreeNode`](crate::OctreeNode) carries two 8-bit masks (which octants exist, and which of those are leaves) plus a slice
//! holding only the occupied children. Leaves hold a [`PointBlock`](crate::PointBlock) of `i16` codes that are decoded as
//! `code * precision + leaf_center`.
//!
//! The tree is built once, by [`OctreeBuilder`](crate::OctreeBuilder) or assembled from parts, and is read-only after that.
//! Queries are stateless depth-first walks: full dumps, node statistics, and view-dependent drawing with frustum culling and a
//! point budget. Rendering, color mapping, culling and picking are supplied by the caller through the traits in [`view`].
//!
//! # Performance
//!
//! - child lookup by octant: O(1) (popcount of the valid mask)
//! - full traversal: O(nodes + points)
//! - stack depth of every query: O(tree depth)
//! - memory usage per internal node: 2 bytes of masks + one slot per *occupied* octant
//! - memory usage per point: `point_dim * 2` bytes

mod builder;
mod config;
mod draw;
mod error;
mod node;
mod points;
mod select;
mod shape;
mod stats;
mod tree;
pub mod view;

#[cfg(test)]
mod test_util;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use node::*;
pub use points::*;
pub use select::PickedPoint;
pub use shape::*;
pub use stats::{TeardownStats, TreeStats};
pub use tree::*;

pub use glam;

/// A linear index of a child octant relative to its parent, in `0..8`.
pub type Octant = u8;

/// A single quantized coordinate or attribute.
pub type ShortCode = i16;
