// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Range, point, and neighbour queries.

use alloc::vec;
use alloc::vec::Vec;
use bitflags::bitflags;

use crate::error::{LooseError, Result};
use crate::region::{BucketKind, RegionId};
use crate::tree::{Key, LooseTree};
use crate::types::Aabb2D;

bitflags! {
    /// Which parts of the tree a query has to look at.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Scan: u8 {
        /// Walk the regions below the root's loose box.
        const REGIONS = 0b0000_0001;
        /// Scan the root's `OuterIntersect` bucket.
        const OUTER_INTERSECT = 0b0000_0010;
        /// Scan the root's `Outer` bucket.
        const OUTER = 0b0000_0100;
    }
}

impl Scan {
    /// Plan a query from how the probe relates to the root's boxes.
    ///
    /// Entries in `Outer` lie wholly outside the loose box, so a probe inside
    /// the tight box cannot reach them. Entries in `OuterIntersect` hang over
    /// the loose edge and can reach anywhere.
    fn plan(inside_tight: bool, touches_loose: bool) -> Self {
        if inside_tight {
            Self::REGIONS | Self::OUTER_INTERSECT
        } else if touches_loose {
            Self::all()
        } else {
            Self::OUTER_INTERSECT | Self::OUTER
        }
    }
}

impl<P: Copy> LooseTree<P> {
    /// Query entries whose rectangle intersects `rect`.
    pub fn query(&self, rect: Aabb2D<f64>) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        if !rect.is_empty() {
            let root = &self.regions[RegionId::ROOT.get()];
            let scan = Scan::plan(root.tight.contains(&rect), root.loose.intersects(&rect));
            self.collect(scan, |b| b.intersects(&rect), None, &mut out);
        }
        out.into_iter()
    }

    /// Query entries whose rectangle contains the point.
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        let root = &self.regions[RegionId::ROOT.get()];
        let scan = Scan::plan(
            root.tight.contains_point(x, y),
            root.loose.contains_point(x, y),
        );
        self.collect(scan, |b| b.contains_point(x, y), None, &mut out);
        out.into_iter()
    }

    /// Query entries intersecting the rectangle stored under `key`, excluding `key` itself.
    pub fn query_overlapping(&self, key: Key) -> Result<impl Iterator<Item = (Key, P)> + '_> {
        let (rect, _) = self.get(key).ok_or(LooseError::stale(key))?;
        let root = &self.regions[RegionId::ROOT.get()];
        let scan = Scan::plan(root.tight.contains(&rect), root.loose.intersects(&rect));
        let mut out = Vec::new();
        self.collect(scan, |b| b.intersects(&rect), Some(key.idx()), &mut out);
        Ok(out.into_iter())
    }

    fn collect<F>(&self, scan: Scan, hits: F, skip: Option<usize>, out: &mut Vec<(Key, P)>)
    where
        F: Fn(&Aabb2D<f64>) -> bool,
    {
        if scan.contains(Scan::REGIONS) {
            self.walk(&hits, skip, out);
        }
        if scan.contains(Scan::OUTER_INTERSECT) {
            let bucket = &self.outer.buckets[BucketKind::OuterIntersect.slot()];
            self.scan_bucket(bucket, &hits, skip, out);
        }
        if scan.contains(Scan::OUTER) {
            let bucket = &self.outer.buckets[BucketKind::Outer.slot()];
            self.scan_bucket(bucket, &hits, skip, out);
        }
    }

    /// Depth-first walk from the root with an explicit `(region, next child)` stack.
    ///
    /// Children are only entered when something lives below them and their
    /// loose box passes `hits`.
    fn walk<F>(&self, hits: &F, skip: Option<usize>, out: &mut Vec<(Key, P)>)
    where
        F: Fn(&Aabb2D<f64>) -> bool,
    {
        let fan_out = self.config.fan_out();
        self.scan_region(RegionId::ROOT, hits, skip, out);
        let mut stack = vec![(RegionId::ROOT, 0_usize)];
        while let Some(frame) = stack.last_mut() {
            let (id, cursor) = *frame;
            let region = &self.regions[id.get()];
            let first = match region.children {
                Some(first) if region.descendants > 0 && cursor < fan_out => first,
                _ => {
                    stack.pop();
                    continue;
                }
            };
            frame.1 += 1;
            let child_id = first.offset(cursor);
            let child = &self.regions[child_id.get()];
            if child.live() > 0 && hits(&child.loose) {
                self.scan_region(child_id, hits, skip, out);
                stack.push((child_id, 0));
            }
        }
    }

    fn scan_region<F>(
        &self,
        id: RegionId,
        hits: &F,
        skip: Option<usize>,
        out: &mut Vec<(Key, P)>,
    ) where
        F: Fn(&Aabb2D<f64>) -> bool,
    {
        let region = &self.regions[id.get()];
        for kind in [BucketKind::CanDescend, BucketKind::CannotDescend] {
            self.scan_bucket(region.bucket(kind), hits, skip, out);
        }
    }

    fn scan_bucket<F>(
        &self,
        bucket: &[usize],
        hits: &F,
        skip: Option<usize>,
        out: &mut Vec<(Key, P)>,
    ) where
        F: Fn(&Aabb2D<f64>) -> bool,
    {
        for &idx in bucket {
            if Some(idx) == skip {
                continue;
            }
            if let Some(e) = self.entries[idx].as_ref()
                && hits(&e.aabb)
            {
                out.push((self.key_for(idx), e.payload));
            }
        }
    }
}
