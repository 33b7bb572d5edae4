//! Separating-axis overlap test between a triangle and an axis-aligned box.

use crate::math::{Point, Real, Vector};

/// Does the triangle `tri` intersect the box of half-extents `half_extents`
/// centered at `center`?
///
/// This is the classic 13-axis separating-axis test: the three box axes,
/// the triangle plane, and the nine cross products of box axes and triangle
/// edges. Degenerate (zero-area) triangles are handled like any other: they
/// can still overlap the box as a segment or a point.
pub(crate) fn triangle_intersects_box(center: &Point, half_extents: &Vector, tri: &[Point; 3]) -> bool {
    // Work in the box's local frame.
    let v0 = tri[0] - center;
    let v1 = tri[1] - center;
    let v2 = tri[2] - center;

    // Box face normals.
    for i in 0..3 {
        let min = v0[i].min(v1[i]).min(v2[i]);
        let max = v0[i].max(v1[i]).max(v2[i]);
        if min > half_extents[i] || max < -half_extents[i] {
            return false;
        }
    }

    let e0 = v1 - v0;
    let e1 = v2 - v1;
    let e2 = v0 - v2;

    // Triangle plane.
    let normal = e0.cross(&e1);
    let r = half_extents.x * normal.x.abs()
        + half_extents.y * normal.y.abs()
        + half_extents.z * normal.z.abs();
    if normal.dot(&v0).abs() > r {
        return false;
    }

    // Cross products of the box axes and the triangle edges.
    for edge in [&e0, &e1, &e2] {
        for i in 0..3 {
            let axis = unit(i).cross(edge);

            if axis.norm_squared() < 1.0e-12 {
                continue;
            }

            let p0 = axis.dot(&v0);
            let p1 = axis.dot(&v1);
            let p2 = axis.dot(&v2);
            let min = p0.min(p1).min(p2);
            let max = p0.max(p1).max(p2);

            let r = half_extents.x * axis.x.abs()
                + half_extents.y * axis.y.abs()
                + half_extents.z * axis.z.abs();

            if min > r || max < -r {
                return false;
            }
        }
    }

    true
}

fn unit(i: usize) -> Vector {
    let mut v = Vector::zeros();
    v[i] = 1.0;
    v
}
