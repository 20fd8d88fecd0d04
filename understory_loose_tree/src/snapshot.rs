// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured dumps of a tree for debugging and visualization.
//!
//! The layout of [`TreeSnapshot`] and its `Display` output are not stable.

use alloc::vec::Vec;
use core::fmt;

use crate::region::{BucketKind, RegionId};
use crate::tree::{Key, LooseTree};
use crate::types::Aabb2D;

/// One region of a [`TreeSnapshot`].
#[derive(Clone, Debug, PartialEq)]
pub struct RegionSnapshot {
    /// Levels below the root.
    pub depth: u32,
    /// Nominal cell.
    pub tight: Aabb2D<f64>,
    /// Padded cell used for containment.
    pub loose: Aabb2D<f64>,
    /// Entries below this region.
    pub descendants: usize,
    /// Entries in the `CanDescend` bucket.
    pub can_descend: Vec<(Key, Aabb2D<f64>)>,
    /// Entries in the `CannotDescend` bucket.
    pub cannot_descend: Vec<(Key, Aabb2D<f64>)>,
    /// Children in row-major order; empty if the region never split.
    pub children: Vec<RegionSnapshot>,
}

impl RegionSnapshot {
    /// Entries held directly by this region.
    pub fn direct(&self) -> usize {
        self.can_descend.len() + self.cannot_descend.len()
    }
}

/// Full dump returned by [`LooseTree::describe`].
#[derive(Clone, Debug, PartialEq)]
pub struct TreeSnapshot {
    /// The root region and everything below it.
    pub root: RegionSnapshot,
    /// Entries overlapping the root's loose box without fitting in it.
    pub outer_intersect: Vec<(Key, Aabb2D<f64>)>,
    /// Entries entirely outside the root's loose box.
    pub outer: Vec<(Key, Aabb2D<f64>)>,
    /// Entries ever inserted.
    pub size: usize,
    /// Live entries.
    pub len: usize,
}

impl<P> LooseTree<P> {
    /// Dump the region hierarchy with bucket contents.
    pub fn describe(&self) -> TreeSnapshot {
        TreeSnapshot {
            root: self.describe_region(RegionId::ROOT),
            outer_intersect: self.describe_bucket(
                &self.outer.buckets[BucketKind::OuterIntersect.slot()],
            ),
            outer: self.describe_bucket(&self.outer.buckets[BucketKind::Outer.slot()]),
            size: self.size(),
            len: self.len(),
        }
    }

    fn describe_region(&self, id: RegionId) -> RegionSnapshot {
        let region = &self.regions[id.get()];
        let children = region.children.map_or_else(Vec::new, |first| {
            (0..self.config.fan_out())
                .map(|i| self.describe_region(first.offset(i)))
                .collect()
        });
        RegionSnapshot {
            depth: region.depth,
            tight: region.tight,
            loose: region.loose,
            descendants: region.descendants,
            can_descend: self.describe_bucket(region.bucket(BucketKind::CanDescend)),
            cannot_descend: self.describe_bucket(region.bucket(BucketKind::CannotDescend)),
            children,
        }
    }

    fn describe_bucket(&self, bucket: &[usize]) -> Vec<(Key, Aabb2D<f64>)> {
        bucket
            .iter()
            .filter_map(|&idx| {
                let e = self.entries[idx].as_ref()?;
                Some((self.key_for(idx), e.aabb))
            })
            .collect()
    }
}

fn write_aabb(f: &mut fmt::Formatter<'_>, a: &Aabb2D<f64>) -> fmt::Result {
    write!(f, "[{}, {}, {}, {}]", a.min_x, a.min_y, a.max_x, a.max_y)
}

fn write_entries(
    f: &mut fmt::Formatter<'_>,
    indent: usize,
    name: &str,
    entries: &[(Key, Aabb2D<f64>)],
) -> fmt::Result {
    if entries.is_empty() {
        return Ok(());
    }
    writeln!(f, "{:indent$}{name}:", "")?;
    for (key, aabb) in entries {
        write!(f, "{:indent$}  {key:?} ", "")?;
        write_aabb(f, aabb)?;
        writeln!(f)?;
    }
    Ok(())
}

impl RegionSnapshot {
    fn write(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        write!(f, "{:indent$}region depth={} tight=", "", self.depth)?;
        write_aabb(f, &self.tight)?;
        write!(f, " loose=")?;
        write_aabb(f, &self.loose)?;
        writeln!(
            f,
            " direct={} descendants={}",
            self.direct(),
            self.descendants
        )?;
        write_entries(f, indent + 2, "can_descend", &self.can_descend)?;
        write_entries(f, indent + 2, "cannot_descend", &self.cannot_descend)?;
        for child in &self.children {
            child.write(f, indent + 4)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.write(f, 0)?;
        write_entries(f, 0, "outer_intersect", &self.outer_intersect)?;
        write_entries(f, 0, "outer", &self.outer)?;
        writeln!(f, "size={} live={}", self.size, self.len)
    }
}
