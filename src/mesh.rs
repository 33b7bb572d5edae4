//! Validated input meshes.

use crate::bounding_volume::Aabb;
use crate::errors::DecompError;
use crate::math::{Point, Real};

/// An input triangle mesh, validated once and immutable for the duration of
/// a decomposition run.
#[derive(Clone, Debug)]
pub struct TriMeshData {
    /// The vertex buffer.
    pub points: Vec<Point>,
    /// The index buffer, with every index in bounds of `points`.
    pub triangles: Vec<[u32; 3]>,
}

impl TriMeshData {
    /// Validates a flat double-precision vertex buffer and a flat index
    /// buffer into a mesh.
    ///
    /// Rejects empty buffers, buffers whose length is not a multiple of
    /// three, non-finite coordinates, and out-of-bounds indices. Zero-area
    /// triangles are accepted; they simply contribute no occupancy.
    pub fn from_f64(points: &[Real], triangle_indices: &[u32]) -> Result<Self, DecompError> {
        Self::validate_layout(points.len(), triangle_indices.len())?;

        let points: Vec<Point> = points
            .chunks_exact(3)
            .map(|p| Point::new(p[0], p[1], p[2]))
            .collect();

        Self::from_parts(points, triangle_indices)
    }

    /// Validates a flat single-precision vertex buffer and a flat index
    /// buffer into a mesh.
    ///
    /// The coordinates are widened to double precision; everything else is
    /// identical to [`Self::from_f64`].
    pub fn from_f32(points: &[f32], triangle_indices: &[u32]) -> Result<Self, DecompError> {
        Self::validate_layout(points.len(), triangle_indices.len())?;

        let points: Vec<Point> = points
            .chunks_exact(3)
            .map(|p| Point::new(p[0] as Real, p[1] as Real, p[2] as Real))
            .collect();

        Self::from_parts(points, triangle_indices)
    }

    fn validate_layout(num_coords: usize, num_indices: usize) -> Result<(), DecompError> {
        if num_coords == 0 {
            return Err(DecompError::EmptyPoints);
        }
        if num_coords % 3 != 0 {
            return Err(DecompError::MalformedPointBuffer(num_coords));
        }
        if num_indices == 0 {
            return Err(DecompError::EmptyTriangles);
        }
        if num_indices % 3 != 0 {
            return Err(DecompError::MalformedIndexBuffer(num_indices));
        }
        Ok(())
    }

    fn from_parts(points: Vec<Point>, triangle_indices: &[u32]) -> Result<Self, DecompError> {
        for (vid, pt) in points.iter().enumerate() {
            if !pt.coords.iter().all(|x| x.is_finite()) {
                return Err(DecompError::NonFiniteCoordinate(vid));
            }
        }

        let num_points = points.len();
        let mut triangles = Vec::with_capacity(triangle_indices.len() / 3);

        for (tid, idx) in triangle_indices.chunks_exact(3).enumerate() {
            for &i in idx {
                if i as usize >= num_points {
                    return Err(DecompError::IndexOutOfBounds {
                        triangle: tid,
                        index: i,
                        num_points,
                    });
                }
            }

            triangles.push([idx[0], idx[1], idx[2]]);
        }

        Ok(Self { points, triangles })
    }

    /// The vertices of the `i`-th triangle.
    pub fn triangle(&self, i: usize) -> [Point; 3] {
        let idx = self.triangles[i];
        [
            self.points[idx[0] as usize],
            self.points[idx[1] as usize],
            self.points[idx[2] as usize],
        ]
    }

    /// The bounding box of the vertex buffer.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }
}
