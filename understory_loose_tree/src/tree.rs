// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The loose grid tree: entry slots, insertion, removal, and pull-up.

use alloc::vec;
use alloc::vec::Vec;
use tracing::{debug, trace};

use crate::config::LooseConfig;
use crate::error::{LooseError, Result};
use crate::region::{BucketKind, Region, RegionId};
use crate::types::Aabb2D;

/// Generational handle for entries.
///
/// A key stays valid until its entry is removed. Slots are reused after
/// removal with a bumped generation, so a stale key never aliases a newer entry.
/// A slot whose generation reaches `u32::MAX` is retired instead of reused, and
/// a tree holds at most `u32::MAX` slots.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "`insert` never allocates a slot index above `u32::MAX`."
    )]
    pub(crate) const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Where an entry is linked: its region, bucket, and index inside that bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Placement {
    region: RegionId,
    kind: BucketKind,
    pos: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct Entry<P> {
    pub(crate) aabb: Aabb2D<f64>,
    pub(crate) payload: P,
    at: Placement,
}

/// Buckets for entries that do not fit inside the root's loose box.
#[derive(Clone, Debug, Default)]
pub(crate) struct OuterBuckets {
    /// `OuterIntersect` and `Outer` entry slots.
    pub(crate) buckets: [Vec<usize>; 2],
}

/// A loose quadtree (or, with other grid factors, a loose `cols × rows`-tree)
/// over a fixed domain.
///
/// Each entry is pushed down only while its whole rectangle fits a single
/// child's loose box, so nothing is ever stored twice and moving entries
/// rarely change regions.
pub struct LooseTree<P> {
    pub(crate) config: LooseConfig,
    pub(crate) regions: Vec<Region>,
    pub(crate) outer: OuterBuckets,
    pub(crate) entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    inserted: usize,
}

impl<P> core::fmt::Debug for LooseTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LooseTree")
            .field("bounds", &self.bounds())
            .field("config", &self.config)
            .field("regions", &self.regions.len())
            .field("live", &self.len())
            .field("inserted", &self.inserted)
            .finish_non_exhaustive()
    }
}

fn bucket_mut<'a>(
    regions: &'a mut [Region],
    outer: &'a mut OuterBuckets,
    region: RegionId,
    kind: BucketKind,
) -> &'a mut Vec<usize> {
    if kind.is_region_bucket() {
        &mut regions[region.get()].buckets[kind.slot()]
    } else {
        &mut outer.buckets[kind.slot()]
    }
}

impl<P> LooseTree<P> {
    /// Create an empty tree covering `bounds`.
    ///
    /// Entries outside `bounds` are still accepted; they are kept in the
    /// root's outer buckets and scanned linearly.
    pub fn new(bounds: Aabb2D<f64>, config: LooseConfig) -> Result<Self> {
        config.validate()?;
        if !bounds.is_finite() || bounds.is_empty() {
            return Err(LooseError::InvalidConfig(
                "bounds must be finite with positive extent",
            ));
        }
        let root = Region::new(bounds, None, 0, config.max_depth, &config);
        Ok(Self {
            config,
            regions: vec![root],
            outer: OuterBuckets::default(),
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            inserted: 0,
        })
    }

    /// Create a tree from the loose-tree parameters in positional form.
    pub fn with_params(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        padding: f64,
        max_objects: usize,
        max_depth: u32,
        cols: u32,
        rows: u32,
    ) -> Result<Self> {
        Self::new(
            Aabb2D::from_xywh(x, y, width, height),
            LooseConfig {
                padding,
                max_objects,
                max_depth,
                cols,
                rows,
            },
        )
    }

    /// The domain passed at construction (the root's tight box).
    pub fn bounds(&self) -> Aabb2D<f64> {
        self.regions[RegionId::ROOT.get()].tight
    }

    /// The root's loose box.
    pub fn loose_bounds(&self) -> Aabb2D<f64> {
        self.regions[RegionId::ROOT.get()].loose
    }

    /// Tuning parameters.
    pub fn config(&self) -> &LooseConfig {
        &self.config
    }

    /// Number of entries ever inserted. Removals do not decrease it; see [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.inserted
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len() - self.free_list.len()
    }

    /// True if no entries are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated regions, the root included.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Returns true if `key` refers to a live entry.
    pub fn is_alive(&self, key: Key) -> bool {
        self.entry(key).is_some()
    }

    /// The rectangle and payload stored under `key`.
    pub fn get(&self, key: Key) -> Option<(Aabb2D<f64>, &P)> {
        self.entry(key).map(|e| (e.aabb, &e.payload))
    }

    /// Which bucket currently holds `key`.
    pub fn bucket_of(&self, key: Key) -> Option<BucketKind> {
        self.entry(key).map(|e| e.at.kind)
    }

    /// Levels between the root and the region holding `key`.
    pub fn depth_of(&self, key: Key) -> Option<u32> {
        self.entry(key).map(|e| self.regions[e.at.region.get()].depth)
    }

    /// Insert a rectangle with a payload. Returns a stable handle.
    pub fn insert(&mut self, aabb: Aabb2D<f64>, payload: P) -> Result<Key> {
        let aabb = LooseError::check_rect(aabb)?;
        let fresh = self.free_list.is_empty();
        if fresh && u32::try_from(self.entries.len()).is_err() {
            return Err(LooseError::SlotsExhausted);
        }
        let (region, kind) = self.locate(&aabb);
        let entry = Entry {
            aabb,
            payload,
            at: Placement {
                region,
                kind,
                pos: 0,
            },
        };
        let (idx, generation) = match self.free_list.pop() {
            // Retired slots never enter the free list, so this cannot overflow.
            Some(idx) => {
                let generation = self.generations[idx] + 1;
                self.generations[idx] = generation;
                self.entries[idx] = Some(entry);
                (idx, generation)
            }
            None => {
                self.entries.push(Some(entry));
                self.generations.push(1);
                (self.entries.len() - 1, 1)
            }
        };
        self.link(idx, region, kind);
        self.inserted += 1;
        Ok(Key::new(idx, generation))
    }

    /// Remove an entry, returning its payload.
    ///
    /// Fails with [`LooseError::HandleAlreadyRemoved`] if `key` is stale.
    pub fn remove(&mut self, key: Key) -> Result<P> {
        let idx = key.idx();
        if self.generations.get(idx) != Some(&key.1) {
            return Err(LooseError::stale(key));
        }
        let entry = self
            .entries
            .get_mut(idx)
            .and_then(Option::take)
            .ok_or(LooseError::stale(key))?;
        self.detach(idx, entry.at);
        self.release(idx);
        Ok(entry.payload)
    }

    /// Move an entry to a new rectangle, keeping its key and payload.
    ///
    /// On error the entry keeps its old rectangle and placement.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<f64>) -> Result<()> {
        let aabb = LooseError::check_rect(aabb)?;
        let at = self.entry(key).ok_or(LooseError::stale(key))?.at;
        let idx = key.idx();
        self.detach(idx, at);
        let (region, kind) = self.locate(&aabb);
        if let Some(e) = self.entries[idx].as_mut() {
            e.aabb = aabb;
        }
        self.link(idx, region, kind);
        Ok(())
    }

    /// Split the root into its `cols × rows` children ahead of demand.
    ///
    /// Returns `true` if children were created by this call, `false` if they
    /// already existed or `max_depth` is zero.
    pub fn subdivide_root(&mut self) -> bool {
        let root = &self.regions[RegionId::ROOT.get()];
        if root.children.is_some() || root.budget == 0 {
            return false;
        }
        self.subdivide(RegionId::ROOT);
        true
    }

    /// Drop every entry and every region below the root.
    ///
    /// Keys issued before the call become stale; [`size`](Self::size) restarts at zero.
    pub fn clear(&mut self) {
        for slot in &mut self.entries {
            *slot = None;
        }
        self.free_list.clear();
        let generations = &self.generations;
        self.free_list
            .extend((0..self.entries.len()).rev().filter(|&i| generations[i] < u32::MAX));
        let root = Region::new(
            self.bounds(),
            None,
            0,
            self.config.max_depth,
            &self.config,
        );
        self.regions.clear();
        self.regions.push(root);
        self.outer = OuterBuckets::default();
        self.inserted = 0;
    }

    // --- internals ---

    /// Make a vacated slot available again unless its generations are used up.
    fn release(&mut self, idx: usize) {
        if self.generations[idx] < u32::MAX {
            self.free_list.push(idx);
        } else {
            debug!(slot = idx, "retiring slot with exhausted generations");
        }
    }

    fn entry(&self, key: Key) -> Option<&Entry<P>> {
        if self.generations.get(key.idx()) != Some(&key.1) {
            return None;
        }
        self.entries.get(key.idx())?.as_ref()
    }

    pub(crate) fn key_for(&self, idx: usize) -> Key {
        Key::new(idx, self.generations[idx])
    }

    /// Find the region and bucket for `aabb`, splitting regions on the way down.
    fn locate(&mut self, aabb: &Aabb2D<f64>) -> (RegionId, BucketKind) {
        let root = &self.regions[RegionId::ROOT.get()];
        if !root.loose.contains(aabb) {
            let kind = if root.loose.intersects(aabb) {
                BucketKind::OuterIntersect
            } else {
                BucketKind::Outer
            };
            return (RegionId::ROOT, kind);
        }
        let mut id = RegionId::ROOT;
        loop {
            let region = &self.regions[id.get()];
            if region.bucket(BucketKind::CanDescend).len() < self.config.max_objects
                || region.budget == 0
            {
                return (id, BucketKind::CanDescend);
            }
            let Some(slot) = region.child_slot(aabb, &self.config) else {
                return (id, BucketKind::CannotDescend);
            };
            let children = region.children;
            let first = match children {
                Some(first) => first,
                None => self.subdivide(id),
            };
            id = first.offset(slot);
        }
    }

    /// Allocate the children of `id`. Returns the first child.
    fn subdivide(&mut self, id: RegionId) -> RegionId {
        if let Some(first) = self.regions[id.get()].children {
            return first;
        }
        let first = RegionId::new(self.regions.len());
        let parent = &self.regions[id.get()];
        let (depth, budget) = (parent.depth + 1, parent.budget.saturating_sub(1));
        let children: Vec<Region> = (0..self.config.fan_out())
            .map(|slot| {
                let tight = parent.child_tight(slot, &self.config);
                Region::new(tight, Some(id), depth, budget, &self.config)
            })
            .collect();
        debug!(
            region = id.get(),
            depth,
            children = children.len(),
            "subdividing region"
        );
        self.regions.extend(children);
        self.regions[id.get()].children = Some(first);
        first
    }

    /// Append slot `idx` to a bucket and count it in every ancestor.
    fn link(&mut self, idx: usize, region: RegionId, kind: BucketKind) {
        let bucket = bucket_mut(&mut self.regions, &mut self.outer, region, kind);
        let pos = bucket.len();
        bucket.push(idx);
        if let Some(e) = self.entries[idx].as_mut() {
            e.at = Placement { region, kind, pos };
        }
        trace!(slot = idx, region = region.get(), ?kind, "linked entry");
        if kind.is_region_bucket() {
            let mut parent = self.regions[region.get()].parent;
            while let Some(p) = parent {
                let r = &mut self.regions[p.get()];
                r.descendants += 1;
                parent = r.parent;
            }
        }
    }

    /// Take slot `idx` out of the bucket it is linked into at `at` and
    /// uncount it from every ancestor.
    fn unlink(&mut self, idx: usize, at: Placement) {
        let Placement { region, kind, pos } = at;
        let bucket = bucket_mut(&mut self.regions, &mut self.outer, region, kind);
        debug_assert_eq!(bucket.get(pos), Some(&idx), "entry position out of sync");
        bucket.swap_remove(pos);
        if let Some(&moved) = bucket.get(pos)
            && let Some(e) = self.entries[moved].as_mut()
        {
            e.at.pos = pos;
        }
        if kind.is_region_bucket() {
            let mut parent = self.regions[region.get()].parent;
            while let Some(p) = parent {
                let r = &mut self.regions[p.get()];
                r.descendants -= 1;
                parent = r.parent;
            }
        }
    }

    /// Unlink slot `idx`; if that empties a region that still has entries
    /// below it, pull one of them up into the emptied region.
    fn detach(&mut self, idx: usize, at: Placement) {
        self.unlink(idx, at);
        if !at.kind.is_region_bucket() {
            return;
        }
        let r = &self.regions[at.region.get()];
        if r.direct() == 0 && r.descendants > 0 {
            self.pull_up(at.region);
        }
    }

    fn pull_up(&mut self, target: RegionId) {
        let fan_out = self.config.fan_out();
        let mut id = target;
        loop {
            let Some(first) = self.regions[id.get()].children else {
                return;
            };
            let kids = (0..fan_out).map(|i| first.offset(i));
            let settled = kids.clone().find(|c| {
                let r = &self.regions[c.get()];
                r.direct() > 0 && r.descendants == 0
            });
            let Some(next) =
                settled.or_else(|| kids.clone().find(|c| self.regions[c.get()].live() > 0))
            else {
                return;
            };
            id = next;
            if self.regions[id.get()].descendants == 0 {
                break;
            }
        }
        let source = &self.regions[id.get()];
        let kind = if source.bucket(BucketKind::CannotDescend).is_empty() {
            BucketKind::CanDescend
        } else {
            BucketKind::CannotDescend
        };
        let bucket = source.bucket(kind);
        let Some(&idx) = bucket.last() else {
            return;
        };
        let at = Placement {
            region: id,
            kind,
            pos: bucket.len() - 1,
        };
        debug!(
            slot = idx,
            from = id.get(),
            to = target.get(),
            "pulling entry up"
        );
        self.unlink(idx, at);
        self.link(idx, target, BucketKind::CanDescend);
    }

    /// Verify bucket positions, counters, containment, and depth for every region.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        for (i, region) in self.regions.iter().enumerate() {
            let id = RegionId::new(i);
            for kind in [BucketKind::CanDescend, BucketKind::CannotDescend] {
                for (pos, &idx) in region.bucket(kind).iter().enumerate() {
                    let e = self.entries[idx].as_ref().expect("bucket holds a dead slot");
                    assert_eq!(e.at, Placement { region: id, kind, pos }, "slot {idx}");
                    assert!(
                        region.loose.contains(&e.aabb),
                        "{:?} escapes loose box {:?}",
                        e.aabb,
                        region.loose
                    );
                }
            }
            assert!(region.depth <= self.config.max_depth, "region too deep");
            let below = region.children.map_or(0, |first| {
                (0..self.config.fan_out())
                    .map(|c| self.regions[first.offset(c).get()].live())
                    .sum()
            });
            assert_eq!(region.descendants, below, "descendant count of region {i}");
        }
        for kind in [BucketKind::OuterIntersect, BucketKind::Outer] {
            for (pos, &idx) in self.outer.buckets[kind.slot()].iter().enumerate() {
                let e = self.entries[idx].as_ref().expect("bucket holds a dead slot");
                assert_eq!((e.at.kind, e.at.pos), (kind, pos), "outer slot {idx}");
            }
        }
        let linked: usize = self.regions.iter().map(Region::direct).sum::<usize>()
            + self.outer.buckets.iter().map(Vec::len).sum::<usize>();
        assert_eq!(linked, self.len(), "every live entry is linked exactly once");
    }
}
