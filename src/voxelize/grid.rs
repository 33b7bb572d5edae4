//! Dense occupancy grid produced by rasterizing the input mesh.

use std::collections::HashMap;
use std::sync::Arc;

use crate::math::{Point, Real, Vector};
use crate::mesh::TriMeshData;
use crate::voxelize::triangle_intersects_box;

/// The occupancy label of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoxelLabel {
    /// Not classified yet. Rasterization leaves every non-boundary cell
    /// undefined; classification replaces this with `Inside` or `Outside`.
    Undefined,
    /// The cell lies outside the solid.
    Outside,
    /// The cell lies inside the solid.
    Inside,
    /// The cell intersects at least one input triangle.
    Boundary,
}

/// Back-references from boundary cells to the triangles that rasterized
/// into them.
///
/// Shared behind an `Arc` so voxel-set clips never copy the map.
#[derive(Clone, Debug, Default)]
pub struct TriangleRefs {
    map: HashMap<[u32; 3], Vec<u32>>,
}

impl TriangleRefs {
    /// The ids of the triangles contributing to the boundary cell at the
    /// given grid coordinates. Empty for non-boundary cells.
    pub fn triangles_at(&self, coords: [u32; 3]) -> &[u32] {
        self.map.get(&coords).map(|v| &v[..]).unwrap_or(&[])
    }
}

/// A dense regular grid covering the bounding box of an input mesh.
///
/// The grid resolution is derived from a target total voxel count: the
/// longest axis of the bounding box gets `cbrt(target)` subdivisions and
/// the other axes get proportionally fewer, so cells stay cubic.
pub struct VoxelGrid {
    origin: Point,
    scale: Real,
    resolution: [u32; 3],
    data: Vec<VoxelLabel>,
    tri_refs: TriangleRefs,
}

impl VoxelGrid {
    /// Rasterizes every triangle of `mesh` into a fresh grid, marking the
    /// cells each triangle passes through as [`VoxelLabel::Boundary`].
    ///
    /// All other cells are left [`VoxelLabel::Undefined`], pending
    /// classification. Zero-area triangles contribute no occupancy beyond
    /// the cells they degenerately touch, and never fault.
    pub fn rasterize(mesh: &TriMeshData, target_voxel_count: u32) -> Self {
        let aabb = mesh.aabb();
        let extents = aabb.extents();
        let longest = extents.max();

        let subdiv = (target_voxel_count.max(8) as Real).cbrt().round() as u32;
        let subdiv = subdiv.clamp(2, 1024);

        let mut result = if longest <= Real::EPSILON {
            // Degenerate mesh collapsed to a point: a single-cell grid.
            Self {
                origin: aabb.mins,
                scale: 1.0,
                resolution: [1, 1, 1],
                data: Vec::new(),
                tri_refs: TriangleRefs::default(),
            }
        } else {
            let mut resolution = [0u32; 3];
            for i in 0..3 {
                if extents[i] == longest {
                    resolution[i] = subdiv;
                } else {
                    resolution[i] = 2 + (subdiv as Real * extents[i] / longest) as u32;
                }
            }

            Self {
                origin: aabb.mins,
                scale: longest / (subdiv as Real - 1.0).max(1.0),
                resolution,
                data: Vec::new(),
                tri_refs: TriangleRefs::default(),
            }
        };

        let len = result.resolution.iter().map(|&r| r as usize).product();
        result.data = vec![VoxelLabel::Undefined; len];

        result.rasterize_triangles(mesh);

        log::debug!(
            "rasterized {} triangles into a {}x{}x{} grid (scale: {})",
            mesh.triangles.len(),
            result.resolution[0],
            result.resolution[1],
            result.resolution[2],
            result.scale,
        );

        result
    }

    fn rasterize_triangles(&mut self, mesh: &TriMeshData) {
        let inv_scale = 1.0 / self.scale;
        let box_half_extents = Vector::repeat(0.5);

        for (tid, _) in mesh.triangles.iter().enumerate() {
            // The triangle in grid coordinates.
            let tri = mesh.triangle(tid);
            let tri = [
                Point::from((tri[0] - self.origin) * inv_scale),
                Point::from((tri[1] - self.origin) * inv_scale),
                Point::from((tri[2] - self.origin) * inv_scale),
            ];

            // Candidate cell range: the triangle's grid-space aabb,
            // dilated by one cell and clamped to the grid.
            let mut ijk0 = [0u32; 3];
            let mut ijk1 = [0u32; 3];

            for i in 0..3 {
                let min = tri[0][i].min(tri[1][i]).min(tri[2][i]);
                let max = tri[0][i].max(tri[1][i]).max(tri[2][i]);
                ijk0[i] = ((min + 0.5).max(0.0) as u32).saturating_sub(1);
                ijk1[i] = (((max + 0.5).max(0.0) as u32) + 1).min(self.resolution[i]);
            }

            for i in ijk0[0]..ijk1[0] {
                for j in ijk0[1]..ijk1[1] {
                    for k in ijk0[2]..ijk1[2] {
                        let center = Point::new(i as Real, j as Real, k as Real);

                        if triangle_intersects_box(&center, &box_half_extents, &tri) {
                            let idx = self.cell_index(i, j, k);
                            self.data[idx] = VoxelLabel::Boundary;
                            self.tri_refs
                                .map
                                .entry([i, j, k])
                                .or_default()
                                .push(tid as u32);
                        }
                    }
                }
            }
        }
    }

    /// The world-space position of the grid cell `(0, 0, 0)`.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The world-space edge length of one cubic cell.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// The number of cells along each axis.
    pub fn resolution(&self) -> [u32; 3] {
        self.resolution
    }

    /// The world-space center of the cell at the given grid coordinates.
    pub fn cell_center(&self, i: u32, j: u32, k: u32) -> Point {
        self.origin + Vector::new(i as Real, j as Real, k as Real) * self.scale
    }

    pub(crate) fn cell_index(&self, i: u32, j: u32, k: u32) -> usize {
        (i as usize)
            + (j as usize) * self.resolution[0] as usize
            + (k as usize) * (self.resolution[0] as usize * self.resolution[1] as usize)
    }

    /// The label of the cell at the given grid coordinates.
    pub fn label(&self, i: u32, j: u32, k: u32) -> VoxelLabel {
        self.data[self.cell_index(i, j, k)]
    }

    pub(crate) fn set_label(&mut self, i: u32, j: u32, k: u32, label: VoxelLabel) {
        let idx = self.cell_index(i, j, k);
        self.data[idx] = label;
    }

    /// Iterates over the grid coordinates of every cell, in memory order.
    pub fn cells(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        let [ri, rj, rk] = self.resolution;
        (0..rk).flat_map(move |k| (0..rj).flat_map(move |j| (0..ri).map(move |i| [i, j, k])))
    }

    /// Extracts the triangle back-reference map, leaving an empty one.
    pub(crate) fn take_tri_refs(&mut self) -> Arc<TriangleRefs> {
        Arc::new(std::mem::take(&mut self.tri_refs))
    }

    /// Counts the cells carrying the given label.
    pub fn count(&self, label: VoxelLabel) -> usize {
        self.data.iter().filter(|&&l| l == label).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    fn unit_cube_grid(target: u32) -> VoxelGrid {
        let (points, triangles) = shapes::cuboid([0.0; 3], [1.0, 1.0, 1.0]);
        let mesh = TriMeshData::from_f64(&points, &triangles).unwrap();
        VoxelGrid::rasterize(&mesh, target)
    }

    #[test]
    fn cube_surface_is_closed() {
        let grid = unit_cube_grid(8_000);
        let [ri, rj, rk] = grid.resolution();
        assert!(ri >= 16 && rj >= 16 && rk >= 16);

        // Every outer shell cell of the mesh's aabb range must be boundary:
        // the grid covers exactly the cube, so the cube faces hit the first
        // and last grid slices.
        assert_eq!(grid.label(0, 0, 0), VoxelLabel::Boundary);
        assert_eq!(grid.label(ri - 1, rj - 1, rk - 1), VoxelLabel::Boundary);

        // The very center of the cube is untouched by the surface.
        assert_eq!(
            grid.label(ri / 2, rj / 2, rk / 2),
            VoxelLabel::Undefined
        );
    }

    #[test]
    fn boundary_cells_reference_their_triangles() {
        let grid = unit_cube_grid(8_000);
        let mut seen_refs = false;

        for [i, j, k] in grid.cells() {
            let refs = grid.tri_refs.triangles_at([i, j, k]);
            if grid.label(i, j, k) == VoxelLabel::Boundary {
                assert!(!refs.is_empty());
                seen_refs = true;
            } else {
                assert!(refs.is_empty());
            }
        }

        assert!(seen_refs);
    }

    #[test]
    fn degenerate_point_mesh_yields_a_single_cell() {
        let mesh = TriMeshData::from_f64(&[0.5, 0.5, 0.5], &[0, 0, 0]).unwrap();
        let grid = VoxelGrid::rasterize(&mesh, 64_000);
        assert_eq!(grid.resolution(), [1, 1, 1]);
        assert_eq!(grid.label(0, 0, 0), VoxelLabel::Boundary);
    }
}
