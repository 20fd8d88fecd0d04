// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Loose Tree: a loose quadtree for moving 2D boxes.
//!
//! Understory Loose Tree is a spatial index for scenes where many axis-aligned boxes move and
//! churn every frame and you repeatedly ask "what overlaps this box?".
//!
//! - Insert, move, and remove axis-aligned rectangles with user payloads.
//! - Query by intersecting rectangle, by point, or by "everything touching this entry".
//! - Dump the region hierarchy with [`LooseTree::describe`] for debugging and visualization.
//!
//! Every region has a tight box (its grid cell) and a loose box (the cell grown by a padding
//! fraction on every side). An entry is pushed into a child only while it fits entirely in that
//! one child's loose box, so entries are never duplicated across cells and an entry that moves a
//! little usually stays where it is. Regions split lazily, the first time an insertion overflows
//! them, into `cols × rows` children. Removing the last direct entry of a region that still has
//! entries below it pulls one of those entries back up, which keeps churned trees shallow.
//!
//! Coordinates are half-open: a box covers `min ≤ p < max` on each axis, so boxes that only
//! share an edge do not intersect.
//!
//! # Example
//!
//! ```rust
//! use understory_loose_tree::{Aabb2D, LooseConfig, LooseTree};
//!
//! let mut tree: LooseTree<u32> =
//!     LooseTree::new(Aabb2D::from_xywh(0.0, 0.0, 400.0, 400.0), LooseConfig::default()).unwrap();
//!
//! let a = tree.insert(Aabb2D::new(0.0, 0.0, 32.0, 32.0), 1).unwrap();
//! let _b = tree.insert(Aabb2D::new(368.0, 368.0, 400.0, 400.0), 2).unwrap();
//!
//! let hits: Vec<_> = tree.query(Aabb2D::new(0.0, 0.0, 400.0, 400.0)).collect();
//! assert_eq!(hits.len(), 2);
//!
//! // Move `a` next to `b` and ask who touches it.
//! tree.update(a, Aabb2D::new(350.0, 350.0, 382.0, 382.0)).unwrap();
//! let touching: Vec<_> = tree.query_overlapping(a).unwrap().collect();
//! assert_eq!(touching.len(), 1);
//! assert_eq!(touching[0].1, 2);
//!
//! // Removing twice is an error, not a double count.
//! assert_eq!(tree.remove(a), Ok(1));
//! assert!(tree.remove(a).is_err());
//! assert_eq!(tree.len(), 1);
//! assert_eq!(tree.size(), 2);
//! ```
//!
//! Kurbo rectangles convert directly:
//!
//! ```rust
//! use understory_loose_tree::{Aabb2D, LooseTree};
//!
//! let mut tree: LooseTree<&str> =
//!     LooseTree::with_params(0.0, 0.0, 100.0, 100.0, 0.25, 4, 6, 2, 2).unwrap();
//! tree.insert(kurbo::Rect::new(10.0, 10.0, 20.0, 20.0).into(), "button").unwrap();
//!
//! let hits: Vec<_> = tree.query_point(15.0, 15.0).collect();
//! assert_eq!(hits[0].1, "button");
//! ```
//!
//! ## Tuning
//!
//! - `padding`: larger values let bigger or faster-moving boxes sink deeper at the cost of
//!   looser culling. `0.25`–`1.0` is typical.
//! - `max_objects`: entries a region keeps before it pushes new ones down.
//! - `max_depth`: hard cap on levels below the root.
//! - `cols`/`rows`: grid factor per split; `2 × 2` is a classic quadtree.
//!
//! Entries outside the tree's bounds are accepted and kept in two root-level buckets that are
//! scanned linearly, so keep the bounds generous.
//!
//! ## Diagnostics
//!
//! Subdivision and pull-up emit `tracing` events at `debug` level; bucket placement emits at
//! `trace` level.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
mod query;
pub mod region;
pub mod snapshot;
pub mod tree;
pub mod types;

pub use config::LooseConfig;
pub use error::LooseError;
pub use region::BucketKind;
pub use snapshot::{RegionSnapshot, TreeSnapshot};
pub use tree::{Key, LooseTree};
pub use types::Aabb2D;
