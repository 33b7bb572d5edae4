//! Flat-buffer builders for simple test meshes.
//!
//! These produce the raw `(points, triangle_indices)` buffers the
//! [`Decomposer`](crate::Decomposer) consumes, which makes examples and
//! tests self-contained.

use crate::math::Real;

/// A closed axis-aligned cuboid spanning `mins..maxs`, as flat buffers:
/// 8 vertices and 12 outward-wound triangles.
pub fn cuboid(mins: [Real; 3], maxs: [Real; 3]) -> (Vec<Real>, Vec<u32>) {
    let [x0, y0, z0] = mins;
    let [x1, y1, z1] = maxs;

    #[rustfmt::skip]
    let points = vec![
        x0, y0, z0, // 0
        x1, y0, z0, // 1
        x1, y1, z0, // 2
        x0, y1, z0, // 3
        x0, y0, z1, // 4
        x1, y0, z1, // 5
        x1, y1, z1, // 6
        x0, y1, z1, // 7
    ];

    #[rustfmt::skip]
    let triangles = vec![
        0, 2, 1, 0, 3, 2, // z = z0
        4, 5, 6, 4, 6, 7, // z = z1
        0, 1, 5, 0, 5, 4, // y = y0
        3, 6, 2, 3, 7, 6, // y = y1
        0, 4, 7, 0, 7, 3, // x = x0
        1, 2, 6, 1, 6, 5, // x = x1
    ];

    (points, triangles)
}

/// Two unit cubes joined by a thin square bridge along the `x` axis.
///
/// The union of the three closed boxes is strongly concave, which makes it
/// a convenient fixture for forcing the decomposer to split.
pub fn dumbbell() -> (Vec<Real>, Vec<u32>) {
    let parts = [
        cuboid([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
        cuboid([1.0, 0.4, 0.4], [2.0, 0.6, 0.6]),
        cuboid([2.0, 0.0, 0.0], [3.0, 1.0, 1.0]),
    ];

    let mut points = Vec::new();
    let mut triangles = Vec::new();

    for (pts, tris) in parts {
        let base = (points.len() / 3) as u32;
        points.extend(pts);
        triangles.extend(tris.into_iter().map(|i| i + base));
    }

    (points, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriMeshData;

    #[test]
    fn cuboid_buffers_are_a_valid_mesh() {
        let (points, triangles) = cuboid([0.0; 3], [1.0, 2.0, 3.0]);
        let mesh = TriMeshData::from_f64(&points, &triangles).unwrap();
        assert_eq!(mesh.points.len(), 8);
        assert_eq!(mesh.triangles.len(), 12);
    }

    #[test]
    fn dumbbell_buffers_are_a_valid_mesh() {
        let (points, triangles) = dumbbell();
        let mesh = TriMeshData::from_f64(&points, &triangles).unwrap();
        assert_eq!(mesh.points.len(), 24);
        assert_eq!(mesh.triangles.len(), 36);
    }
}
