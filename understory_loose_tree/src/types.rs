// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.
//!
//! Every predicate here treats boxes as half-open on the high side: a point
//! `(x, y)` is inside when `min_x <= x < max_x` and `min_y <= y < max_y`.

use core::cmp::Ordering;

/// Axis-aligned bounding box in 2D.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right), exclusive
    pub max_x: T,
    /// Maximum y (bottom), exclusive
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point.
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && le(self.min_y, y) && lt(x, self.max_x) && lt(y, self.max_y)
    }

    /// Whether `other` lies entirely inside this AABB.
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(self.min_y, other.min_y)
            && le(other.max_x, self.max_x)
            && le(other.max_y, self.max_y)
    }

    /// Whether the two AABBs share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        lt(self.min_x, other.max_x)
            && lt(other.min_x, self.max_x)
            && lt(self.min_y, other.max_y)
            && lt(other.min_y, self.max_y)
    }

    /// Return true if the AABB covers no point (zero area or inverted).
    ///
    /// Also true when any comparison is undefined (NaN coordinates).
    pub fn is_empty(&self) -> bool {
        !lt(self.min_x, self.max_x) || !lt(self.min_y, self.max_y)
    }
}

impl Aabb2D<f64> {
    /// Create an AABB from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grow the box by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        Self {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// True if all four coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Convert to a Kurbo rectangle.
    pub fn to_rect(&self) -> kurbo::Rect {
        kurbo::Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<kurbo::Rect> for Aabb2D<f64> {
    /// Kurbo rectangles may be stored with swapped corners; this normalizes them.
    fn from(r: kurbo::Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_containment_is_half_open() {
        let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains_point(0.0, 0.0), "low corner is inside");
        assert!(a.contains_point(9.999, 9.999));
        assert!(!a.contains_point(10.0, 5.0), "right edge is outside");
        assert!(!a.contains_point(5.0, 10.0), "bottom edge is outside");
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb2D::new(10.0, 0.0, 20.0, 10.0);
        let c = Aabb2D::new(9.5, 9.5, 20.0, 20.0);
        assert!(!a.intersects(&b), "shared edge is not an overlap");
        assert!(a.intersects(&c));
        assert!(c.intersects(&a), "intersection is symmetric");
    }

    #[test]
    fn containment_allows_shared_high_edge() {
        let outer = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&Aabb2D::new(2.0, 2.0, 10.0, 10.0)));
        assert!(!outer.contains(&Aabb2D::new(-1.0, 2.0, 5.0, 5.0)));
        assert!(!outer.contains(&Aabb2D::new(2.0, 2.0, 10.5, 5.0)));
    }

    #[test]
    fn nan_boxes_are_empty_and_never_intersect() {
        let nan = Aabb2D::new(f64::NAN, 0.0, 1.0, 1.0);
        let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
        assert!(nan.is_empty());
        assert!(!nan.is_finite());
        assert!(!a.intersects(&nan));
        assert!(!a.contains(&nan));
    }

    #[test]
    fn kurbo_round_trip_normalizes_corners() {
        let r = kurbo::Rect::new(10.0, 20.0, 0.0, 5.0);
        let a = Aabb2D::from(r);
        assert_eq!(a, Aabb2D::new(0.0, 5.0, 10.0, 20.0));
        assert_eq!(a.to_rect(), kurbo::Rect::new(0.0, 5.0, 10.0, 20.0));
        assert_eq!(a.inflate(1.0, 2.0), Aabb2D::new(-1.0, 3.0, 11.0, 22.0));
    }
}
