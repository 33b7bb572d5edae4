//! Inside/outside classification of a rasterized voxel grid.

use std::collections::VecDeque;

use crate::math::Real;
use crate::mesh::TriMeshData;
use crate::params::FillMode;
use crate::voxelize::{VoxelGrid, VoxelLabel};

/// Labels every [`VoxelLabel::Undefined`] cell of `grid` as inside or
/// outside the solid, according to the requested fill mode.
///
/// After this call no cell is left undefined.
pub fn classify(grid: &mut VoxelGrid, mesh: &TriMeshData, fill_mode: FillMode) {
    match fill_mode {
        FillMode::FloodFill => flood_fill(grid),
        FillMode::SurfaceOnly => surface_only(grid),
        FillMode::RaycastFill => raycast_fill(grid, mesh),
    }

    log::debug!(
        "classified grid: {} boundary, {} inside, {} outside cells",
        grid.count(VoxelLabel::Boundary),
        grid.count(VoxelLabel::Inside),
        grid.count(VoxelLabel::Outside),
    );
}

/// Propagates `Outside` from the six outer shells of the grid through every
/// reachable non-boundary cell; whatever remains unreached is `Inside`.
///
/// A mesh with holes lets the flood reach its interior, producing a hollow
/// result. That is the documented behavior of this mode, not an error.
fn flood_fill(grid: &mut VoxelGrid) {
    let [ri, rj, rk] = grid.resolution();
    let mut queue = VecDeque::new();

    let mut seed = |grid: &mut VoxelGrid, queue: &mut VecDeque<[u32; 3]>, i: u32, j: u32, k: u32| {
        if grid.label(i, j, k) == VoxelLabel::Undefined {
            grid.set_label(i, j, k, VoxelLabel::Outside);
            queue.push_back([i, j, k]);
        }
    };

    for i in 0..ri {
        for j in 0..rj {
            seed(grid, &mut queue, i, j, 0);
            seed(grid, &mut queue, i, j, rk - 1);
        }
    }
    for i in 0..ri {
        for k in 0..rk {
            seed(grid, &mut queue, i, 0, k);
            seed(grid, &mut queue, i, rj - 1, k);
        }
    }
    for j in 0..rj {
        for k in 0..rk {
            seed(grid, &mut queue, 0, j, k);
            seed(grid, &mut queue, ri - 1, j, k);
        }
    }

    while let Some([i, j, k]) = queue.pop_front() {
        let neighbors = [
            (i.wrapping_sub(1), j, k),
            (i + 1, j, k),
            (i, j.wrapping_sub(1), k),
            (i, j + 1, k),
            (i, j, k.wrapping_sub(1)),
            (i, j, k + 1),
        ];

        for (ni, nj, nk) in neighbors {
            if ni < ri && nj < rj && nk < rk && grid.label(ni, nj, nk) == VoxelLabel::Undefined {
                grid.set_label(ni, nj, nk, VoxelLabel::Outside);
                queue.push_back([ni, nj, nk]);
            }
        }
    }

    for [i, j, k] in grid.cells().collect::<Vec<_>>() {
        if grid.label(i, j, k) == VoxelLabel::Undefined {
            grid.set_label(i, j, k, VoxelLabel::Inside);
        }
    }
}

/// Keeps only the surface solid. Produces hollow shells.
fn surface_only(grid: &mut VoxelGrid) {
    for [i, j, k] in grid.cells().collect::<Vec<_>>() {
        if grid.label(i, j, k) == VoxelLabel::Undefined {
            grid.set_label(i, j, k, VoxelLabel::Outside);
        }
    }
}

/// Classifies each undefined cell by the parity of mesh crossings between
/// the cell center and the grid boundary, along `+x`.
///
/// Rather than casting one ray per cell, all crossings of a `(j, k)` column
/// with the mesh are gathered once and every cell of the column is
/// classified against the sorted crossing list. The column line is shifted
/// by a tiny fraction of a cell so that lattice-aligned mesh edges do not
/// lie exactly on it.
fn raycast_fill(grid: &mut VoxelGrid, mesh: &TriMeshData) {
    let [ri, rj, rk] = grid.resolution();
    let scale = grid.scale();
    let jitter = scale * 3.0e-4;

    let mut crossings: Vec<Real> = Vec::new();

    for k in 0..rk {
        for j in 0..rj {
            let line = grid.cell_center(0, j, k);
            // Unequal offsets per axis, so the line cannot track a shared
            // triangle edge lying on a lattice diagonal.
            let y = line.y + jitter;
            let z = line.z + jitter * 0.618_033_988_75;

            crossings.clear();

            for tid in 0..mesh.triangles.len() {
                let [a, b, c] = mesh.triangle(tid);

                // 2D barycentric test in the yz plane.
                let det = (b.y - a.y) * (c.z - a.z) - (c.y - a.y) * (b.z - a.z);
                if det.abs() < 1.0e-14 {
                    // Triangle parallel to the ray; adjacent triangles
                    // account for its crossings.
                    continue;
                }

                let u = ((y - a.y) * (c.z - a.z) - (c.y - a.y) * (z - a.z)) / det;
                let v = ((b.y - a.y) * (z - a.z) - (y - a.y) * (b.z - a.z)) / det;

                if u >= 0.0 && v >= 0.0 && u + v <= 1.0 {
                    crossings.push(a.x + u * (b.x - a.x) + v * (c.x - a.x));
                }
            }

            crossings.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            for i in 0..ri {
                if grid.label(i, j, k) != VoxelLabel::Undefined {
                    continue;
                }

                let x = grid.cell_center(i, j, k).x;
                let ahead = crossings.iter().filter(|&&c| c > x).count();

                let label = if ahead % 2 == 1 {
                    VoxelLabel::Inside
                } else {
                    VoxelLabel::Outside
                };
                grid.set_label(i, j, k, label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    fn cube_grid() -> (VoxelGrid, TriMeshData) {
        let (points, triangles) = shapes::cuboid([0.0; 3], [1.0, 1.0, 1.0]);
        let mesh = TriMeshData::from_f64(&points, &triangles).unwrap();
        let grid = VoxelGrid::rasterize(&mesh, 8_000);
        (grid, mesh)
    }

    #[test]
    fn flood_fill_labels_cube_interior() {
        let (mut grid, mesh) = cube_grid();
        classify(&mut grid, &mesh, FillMode::FloodFill);

        let [ri, rj, rk] = grid.resolution();
        assert_eq!(grid.label(ri / 2, rj / 2, rk / 2), VoxelLabel::Inside);
        assert_eq!(grid.count(VoxelLabel::Undefined), 0);
        assert!(grid.count(VoxelLabel::Inside) > 0);
    }

    #[test]
    fn surface_only_leaves_a_hollow_shell() {
        let (mut grid, mesh) = cube_grid();
        classify(&mut grid, &mesh, FillMode::SurfaceOnly);

        let [ri, rj, rk] = grid.resolution();
        assert_eq!(grid.label(ri / 2, rj / 2, rk / 2), VoxelLabel::Outside);
        assert_eq!(grid.count(VoxelLabel::Inside), 0);
        assert_eq!(grid.count(VoxelLabel::Undefined), 0);
    }

    #[test]
    fn raycast_fill_labels_cube_interior() {
        let (mut grid, mesh) = cube_grid();
        classify(&mut grid, &mesh, FillMode::RaycastFill);

        let [ri, rj, rk] = grid.resolution();
        assert_eq!(grid.label(ri / 2, rj / 2, rk / 2), VoxelLabel::Inside);
        assert_eq!(grid.count(VoxelLabel::Undefined), 0);
    }

    #[test]
    fn raycast_and_flood_fill_agree_on_a_closed_cube() {
        let (mut flood, mesh) = cube_grid();
        let mut raycast = VoxelGrid::rasterize(&mesh, 8_000);
        classify(&mut flood, &mesh, FillMode::FloodFill);
        classify(&mut raycast, &mesh, FillMode::RaycastFill);

        let disagreements = flood
            .cells()
            .filter(|&[i, j, k]| flood.label(i, j, k) != raycast.label(i, j, k))
            .count();

        // Both modes must agree almost everywhere on a watertight convex
        // mesh; a handful of cells grazing the surface may differ.
        let total = flood.cells().count();
        assert!(disagreements * 100 <= total);
    }
}
