// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Regions (tree nodes) and their bucket classification.

use alloc::vec::Vec;

use crate::config::LooseConfig;
use crate::types::Aabb2D;

/// Which bucket of a region an entry lives in.
///
/// Every region has the first two buckets. The last two exist only at the
/// root and hold entries that do not fit inside the root's loose box.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BucketKind {
    /// Stored while the region still has spare capacity; may be pushed into a child later.
    CanDescend,
    /// Straddles the padding margin between children, so no single child can own it.
    CannotDescend,
    /// Outside the root's loose box but overlapping it.
    OuterIntersect,
    /// Entirely outside the root's loose box.
    Outer,
}

impl BucketKind {
    /// True for the kinds that every region carries.
    pub const fn is_region_bucket(self) -> bool {
        matches!(self, Self::CanDescend | Self::CannotDescend)
    }

    /// Position of this kind in a region's or the root's bucket pair.
    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::CanDescend | Self::OuterIntersect => 0,
            Self::CannotDescend | Self::Outer => 1,
        }
    }
}

/// Index of a region inside the tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RegionId(u32);

impl RegionId {
    pub(crate) const ROOT: Self = Self(0);

    #[allow(
        clippy::cast_possible_truncation,
        reason = "Region arenas never approach u32::MAX nodes."
    )]
    pub(crate) const fn new(i: usize) -> Self {
        Self(i as u32)
    }

    pub(crate) const fn get(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn offset(self, n: usize) -> Self {
        Self::new(self.get() + n)
    }
}

/// One cell of the loose grid tree.
#[derive(Clone, Debug)]
pub(crate) struct Region {
    /// Nominal cell, `[x, x + w) × [y, y + h)`.
    pub(crate) tight: Aabb2D<f64>,
    /// Tight box grown by `padding` on every side; every entry stored here fits inside it.
    pub(crate) loose: Aabb2D<f64>,
    /// Tight box grown by one child's padding. An entry whose low corner is
    /// outside this box cannot fit any child's loose box.
    inner: Aabb2D<f64>,
    sub_w: f64,
    sub_h: f64,
    /// Levels between the root and this region.
    pub(crate) depth: u32,
    /// Levels that may still be created below this region.
    pub(crate) budget: u32,
    pub(crate) parent: Option<RegionId>,
    /// First of `cols × rows` contiguous children, row-major.
    pub(crate) children: Option<RegionId>,
    /// `CanDescend` and `CannotDescend` entry slots.
    pub(crate) buckets: [Vec<usize>; 2],
    /// Entries stored anywhere strictly below this region.
    pub(crate) descendants: usize,
}

impl Region {
    pub(crate) fn new(
        tight: Aabb2D<f64>,
        parent: Option<RegionId>,
        depth: u32,
        budget: u32,
        cfg: &LooseConfig,
    ) -> Self {
        let sub_w = tight.width() / f64::from(cfg.cols);
        let sub_h = tight.height() / f64::from(cfg.rows);
        Self {
            tight,
            loose: loose_box(tight, cfg.padding),
            inner: tight.inflate(sub_w * cfg.padding, sub_h * cfg.padding),
            sub_w,
            sub_h,
            depth,
            budget,
            parent,
            children: None,
            buckets: [Vec::new(), Vec::new()],
            descendants: 0,
        }
    }

    /// Entries held in this region's own buckets.
    pub(crate) fn direct(&self) -> usize {
        self.buckets[0].len() + self.buckets[1].len()
    }

    /// Entries held here or anywhere below.
    pub(crate) fn live(&self) -> usize {
        self.direct() + self.descendants
    }

    pub(crate) fn bucket(&self, kind: BucketKind) -> &Vec<usize> {
        debug_assert!(kind.is_region_bucket(), "regions only carry inner buckets");
        &self.buckets[kind.slot()]
    }

    /// Row-major position of the single child whose loose box can hold `rect`,
    /// or `None` when `rect` straddles the padding margin between children.
    pub(crate) fn child_slot(&self, rect: &Aabb2D<f64>, cfg: &LooseConfig) -> Option<usize> {
        let ox = rect.min_x - self.inner.min_x;
        let oy = rect.min_y - self.inner.min_y;
        if ox < 0.0 || oy < 0.0 || ox >= self.inner.width() || oy >= self.inner.height() {
            return None;
        }
        let cx = cell_index(ox, self.sub_w, cfg.cols);
        let cy = cell_index(oy, self.sub_h, cfg.rows);
        let slot = cy * cfg.cols as usize + cx;
        // Same arithmetic the child uses for its own loose box.
        let child_loose = loose_box(self.child_tight(slot, cfg), cfg.padding);
        child_loose.contains(rect).then_some(slot)
    }

    /// Tight box of the child at row-major position `slot`.
    ///
    /// The last row and column snap to the parent's edge so children tile it exactly.
    pub(crate) fn child_tight(&self, slot: usize, cfg: &LooseConfig) -> Aabb2D<f64> {
        let cols = cfg.cols as usize;
        let rows = cfg.rows as usize;
        let (cx, cy) = (slot % cols, slot / cols);
        let min_x = self.tight.min_x + cx as f64 * self.sub_w;
        let min_y = self.tight.min_y + cy as f64 * self.sub_h;
        let max_x = if cx + 1 == cols {
            self.tight.max_x
        } else {
            self.tight.min_x + (cx + 1) as f64 * self.sub_w
        };
        let max_y = if cy + 1 == rows {
            self.tight.max_y
        } else {
            self.tight.min_y + (cy + 1) as f64 * self.sub_h
        };
        Aabb2D::new(min_x, min_y, max_x, max_y)
    }
}

fn loose_box(tight: Aabb2D<f64>, padding: f64) -> Aabb2D<f64> {
    tight.inflate(tight.width() * padding, tight.height() * padding)
}

/// Floor of `offset / size`, clamped to the last cell. `offset` is non-negative.
fn cell_index(offset: f64, size: f64, cells: u32) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Offsets are non-negative and finite, so truncation is a floor."
    )]
    let i = (offset / size) as usize;
    i.min(cells as usize - 1)
}
