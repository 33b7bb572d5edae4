//! Distance queries against a finished set of convex hulls.
//!
//! The result sets are small enough that a linear scan beats any
//! acceleration structure, so there is none.

use ordered_float::OrderedFloat;

use crate::aggregate::ConvexHull;
use crate::math::{Point, Real};

/// The point of the segment `[a, b]` closest to `pt`.
pub fn closest_point_on_segment(pt: &Point, a: &Point, b: &Point) -> Point {
    let ab = b - a;
    let sq_len = ab.norm_squared();

    if sq_len <= Real::EPSILON {
        return *a;
    }

    let t = (ab.dot(&(pt - a)) / sq_len).clamp(0.0, 1.0);
    a + ab * t
}

/// The point of the triangle `abc` closest to `pt`.
///
/// Walks the Voronoi regions of the triangle (vertices, then edges, then
/// the face interior). Zero-area triangles degrade to the closest edge
/// point instead of dividing by zero.
pub fn closest_point_on_triangle(pt: &Point, a: &Point, b: &Point, c: &Point) -> Point {
    let ab = b - a;
    let ac = c - a;

    let ap = pt - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = pt - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        return a + ab * (d1 / (d1 - d3));
    }

    let cp = pt - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        return a + ac * (d2 / (d2 - d6));
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
        return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
    }

    let denom = va + vb + vc;
    if denom <= Real::EPSILON {
        // Degenerate triangle.
        let candidates = [
            closest_point_on_segment(pt, a, b),
            closest_point_on_segment(pt, b, c),
            closest_point_on_segment(pt, c, a),
        ];
        return candidates
            .into_iter()
            .min_by_key(|q| OrderedFloat((pt - q).norm_squared()))
            .unwrap_or(*a)
    }

    a + ab * (vb / denom) + ac * (vc / denom)
}

/// The distance from `pt` to `hull`, zero if `pt` is inside it.
pub fn point_hull_distance(pt: &Point, hull: &ConvexHull) -> Real {
    if hull.triangles.is_empty() {
        // Degenerate point or segment hull.
        return match hull.points.len() {
            0 => Real::INFINITY,
            1 => (pt - hull.points[0]).norm(),
            _ => (pt - closest_point_on_segment(pt, &hull.points[0], &hull.points[1])).norm(),
        };
    }

    let tol = hull.aabb.extents().norm() * 1.0e-9;
    let mut inside = true;
    let mut min_sq_dist = Real::INFINITY;

    for tri in &hull.triangles {
        let a = hull.points[tri[0] as usize];
        let b = hull.points[tri[1] as usize];
        let c = hull.points[tri[2] as usize];

        // Faces are wound counter-clockwise seen from outside, so a point
        // beyond any face plane is outside the hull.
        let normal = (b - a).cross(&(c - a));
        if normal.dot(&(pt - a)) > tol * normal.norm() {
            inside = false;
        }

        let q = closest_point_on_triangle(pt, &a, &b, &c);
        min_sq_dist = min_sq_dist.min((pt - q).norm_squared());
    }

    if inside {
        0.0
    } else {
        min_sq_dist.sqrt()
    }
}

/// The id of the hull closest to `pt`, and the distance to it. Ties go to
/// the lower id. `None` only for an empty result set.
pub fn find_nearest_hull(hulls: &[ConvexHull], pt: &Point) -> Option<(u32, Real)> {
    hulls
        .iter()
        .enumerate()
        .map(|(id, hull)| (id as u32, point_hull_distance(pt, hull)))
        .min_by_key(|&(id, dist)| (OrderedFloat(dist), id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hull::HullMesh;
    use approx::assert_relative_eq;

    fn tri() -> (Point, Point, Point) {
        (
            Point::origin(),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
        )
    }

    #[test]
    fn closest_point_in_every_voronoi_region() {
        let (a, b, c) = tri();

        // Face interior: straight projection.
        let q = closest_point_on_triangle(&Point::new(0.5, 0.5, 3.0), &a, &b, &c);
        assert_relative_eq!(q.x, 0.5);
        assert_relative_eq!(q.y, 0.5);
        assert_relative_eq!(q.z, 0.0);

        // Vertex region.
        let q = closest_point_on_triangle(&Point::new(-1.0, -1.0, 0.0), &a, &b, &c);
        assert_eq!(q, a);

        // Edge region of ab.
        let q = closest_point_on_triangle(&Point::new(1.0, -2.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q.x, 1.0);
        assert_relative_eq!(q.y, 0.0);

        // Edge region of the hypotenuse.
        let q = closest_point_on_triangle(&Point::new(2.0, 2.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q.x, 1.0);
        assert_relative_eq!(q.y, 1.0);
    }

    #[test]
    fn degenerate_triangle_does_not_blow_up() {
        let a = Point::origin();
        let b = Point::new(1.0, 0.0, 0.0);
        let q = closest_point_on_triangle(&Point::new(0.5, 1.0, 0.0), &a, &b, &a);
        assert_relative_eq!(q.x, 0.5);
        assert_relative_eq!(q.y, 0.0);
    }

    fn cube_hull() -> ConvexHull {
        let mut pts = Vec::new();
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for z in [0.0, 1.0] {
                    pts.push(Point::new(x, y, z));
                }
            }
        }
        ConvexHull::from_mesh(HullMesh::compute(&pts, u32::MAX), 0)
    }

    #[test]
    fn interior_points_are_at_distance_zero() {
        let hull = cube_hull();
        assert_eq!(point_hull_distance(&Point::new(0.5, 0.5, 0.5), &hull), 0.0);
        assert_eq!(point_hull_distance(&Point::new(0.9, 0.1, 0.5), &hull), 0.0);
        // Surface points count as inside.
        assert_eq!(point_hull_distance(&Point::new(1.0, 0.5, 0.5), &hull), 0.0);
    }

    #[test]
    fn exterior_distance_is_the_surface_distance() {
        let hull = cube_hull();
        let d = point_hull_distance(&Point::new(2.0, 0.5, 0.5), &hull);
        assert_relative_eq!(d, 1.0, epsilon = 1.0e-9);

        let d = point_hull_distance(&Point::new(2.0, 2.0, 0.5), &hull);
        assert_relative_eq!(d, Real::sqrt(2.0), epsilon = 1.0e-9);
    }

    #[test]
    fn nearest_hull_ties_break_on_the_lower_id() {
        let a = cube_hull();
        let mut b = cube_hull();
        b.mesh_id = 1;
        let hulls = [a, b];

        let (id, dist) = find_nearest_hull(&hulls, &Point::new(3.0, 0.5, 0.5)).unwrap();
        assert_eq!(id, 0);
        assert_relative_eq!(dist, 2.0, epsilon = 1.0e-9);

        assert!(find_nearest_hull(&[], &Point::origin()).is_none());
    }
}
