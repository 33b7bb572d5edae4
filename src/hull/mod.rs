//! Convex hull fitting over point clouds.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};

mod incremental;

/// An indexed triangle mesh describing a (possibly degenerate) convex hull.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HullMesh {
    /// The hull vertices.
    pub points: Vec<Point>,
    /// The hull faces, wound counter-clockwise seen from outside.
    pub triangles: Vec<[u32; 3]>,
}

impl HullMesh {
    /// Fits a convex hull to `points`, keeping at most `max_vertices`
    /// vertices.
    ///
    /// When the true hull needs more vertices than the budget allows, the
    /// least significant ones (smallest contribution to the enclosed
    /// volume) are left out. Degenerate point clouds produce a minimal
    /// point, segment, or triangle hull instead of failing.
    pub fn compute(points: &[Point], max_vertices: u32) -> Self {
        incremental::convex_hull(points, max_vertices)
    }

    pub(crate) fn single_point(pt: Point) -> Self {
        Self {
            points: vec![pt],
            triangles: Vec::new(),
        }
    }

    pub(crate) fn segment(a: Point, b: Point) -> Self {
        Self {
            points: vec![a, b],
            triangles: Vec::new(),
        }
    }

    pub(crate) fn triangle(a: Point, b: Point, c: Point) -> Self {
        Self {
            points: vec![a, b, c],
            triangles: vec![[0, 1, 2]],
        }
    }

    /// The number of hull vertices.
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// The enclosed volume. Zero for degenerate hulls.
    pub fn volume(&self) -> Real {
        self.volume_and_centroid().0
    }

    /// The enclosed volume and its centroid.
    ///
    /// Computed as a signed tetrahedron sum against the vertex mean, which
    /// stays valid for the closed (but possibly slightly non-convex)
    /// meshes produced by shrink-wrapping. Degenerate hulls report a zero
    /// volume and the vertex mean as centroid.
    pub fn volume_and_centroid(&self) -> (Real, Point) {
        let mean = self.vertex_mean();

        if self.triangles.is_empty() {
            return (0.0, mean);
        }

        let mut volume = 0.0;
        let mut centroid = Vector::zeros();

        for tri in &self.triangles {
            let a = self.points[tri[0] as usize];
            let b = self.points[tri[1] as usize];
            let c = self.points[tri[2] as usize];

            let v = (a - mean).dot(&(b - mean).cross(&(c - mean))) / 6.0;
            volume += v;
            centroid += (a.coords + b.coords + c.coords + mean.coords) * (v / 4.0);
        }

        if volume <= Real::EPSILON || !volume.is_finite() {
            (0.0, mean)
        } else {
            (volume, Point::from(centroid / volume))
        }
    }

    fn vertex_mean(&self) -> Point {
        if self.points.is_empty() {
            return Point::origin();
        }

        let denom = 1.0 / self.points.len() as Real;
        let mut mean = Vector::zeros();
        for pt in &self.points {
            mean += pt.coords * denom;
        }
        Point::from(mean)
    }

    /// The bounding box of the hull vertices.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }
}
