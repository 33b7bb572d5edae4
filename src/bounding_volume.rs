//! Axis-aligned bounding boxes.

use crate::math::{Point, Real, Vector};

/// An axis-aligned bounding box defined by its two extreme corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    /// The corner with the smallest coordinates.
    pub mins: Point,
    /// The corner with the largest coordinates.
    pub maxs: Point,
}

impl Aabb {
    /// Builds an aabb from its extreme corners.
    pub fn new(mins: Point, maxs: Point) -> Self {
        Self { mins, maxs }
    }

    /// The smallest aabb enclosing all the given points.
    ///
    /// Returns a degenerate aabb at the origin if `points` is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut it = points.into_iter();
        let first = match it.next() {
            Some(pt) => *pt,
            None => Point::origin(),
        };

        let mut result = Aabb::new(first, first);

        for pt in it {
            result.mins = result.mins.inf(pt);
            result.maxs = result.maxs.sup(pt);
        }

        result
    }

    /// The center of this aabb.
    pub fn center(&self) -> Point {
        Point::from((self.mins.coords + self.maxs.coords) / 2.0)
    }

    /// The length of this aabb along each axis.
    pub fn extents(&self) -> Vector {
        self.maxs - self.mins
    }

    /// Half of [`Self::extents`].
    pub fn half_extents(&self) -> Vector {
        self.extents() / 2.0
    }

    /// The length of the longest edge of this aabb.
    pub fn max_extent(&self) -> Real {
        self.extents().max()
    }

    /// Does this aabb intersect `other`, with each box dilated by `margin`?
    pub fn intersects_dilated(&self, other: &Aabb, margin: Real) -> bool {
        (0..3).all(|i| {
            self.mins[i] - margin <= other.maxs[i] && other.mins[i] - margin <= self.maxs[i]
        })
    }
}
