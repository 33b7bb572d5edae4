//! Sparse sets of filled voxels, the unit of work of the recursive
//! decomposer.

use std::sync::Arc;

use crate::math::{Point, Real, Vector};
use crate::voxelize::{TriangleRefs, VoxelGrid, VoxelLabel};

/// A single filled voxel of a [`VoxelSet`].
#[derive(Copy, Clone, Debug)]
pub struct Voxel {
    /// The integer coordinates of the voxel in the original grid.
    pub coords: [u32; 3],
    /// Is this voxel on the surface of the volume (rather than inside it)?
    pub is_on_surface: bool,
}

/// An axis-aligned cutting plane in voxel coordinates.
///
/// Voxels whose `coords[axis]` is below `offset` go to the negative side.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CutPlane {
    /// The axis the plane is orthogonal to (0, 1 or 2).
    pub axis: usize,
    /// The plane position along `axis`, in fractional voxel coordinates.
    pub offset: Real,
}

/// A sparse, connected-ish subset of the filled voxels of a grid.
///
/// Only voxels considered "full" after classification are stored. The
/// triangle back-reference map of the source grid travels with every set
/// behind an `Arc`, so splitting never copies it.
#[derive(Clone)]
pub struct VoxelSet {
    origin: Point,
    scale: Real,
    min_bb: [u32; 3],
    max_bb: [u32; 3],
    voxels: Vec<Voxel>,
    tri_refs: Arc<TriangleRefs>,
}

impl VoxelSet {
    /// Extracts every `Inside` and `Boundary` cell of a classified grid
    /// into a sparse set. The grid can be dropped afterwards.
    pub fn from_grid(grid: &mut VoxelGrid) -> Self {
        let mut voxels = Vec::new();

        for [i, j, k] in grid.cells() {
            match grid.label(i, j, k) {
                VoxelLabel::Inside => voxels.push(Voxel {
                    coords: [i, j, k],
                    is_on_surface: false,
                }),
                VoxelLabel::Boundary => voxels.push(Voxel {
                    coords: [i, j, k],
                    is_on_surface: true,
                }),
                _ => {}
            }
        }

        let mut result = Self {
            origin: grid.origin(),
            scale: grid.scale(),
            min_bb: [0; 3],
            max_bb: [0; 3],
            voxels,
            tri_refs: grid.take_tri_refs(),
        };
        result.compute_bb();
        result
    }

    /// The world-space position of the voxel grid origin.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// The world-space edge length of one voxel.
    pub fn scale(&self) -> Real {
        self.scale
    }

    /// The triangle back-references inherited from the source grid.
    pub fn tri_refs(&self) -> &Arc<TriangleRefs> {
        &self.tri_refs
    }

    /// The number of voxels in this set.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Is this set empty?
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// The voxels of this set.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// The volume of a single voxel.
    pub fn voxel_volume(&self) -> Real {
        self.scale * self.scale * self.scale
    }

    /// The total volume covered by the voxels of this set.
    pub fn compute_volume(&self) -> Real {
        self.voxel_volume() * self.voxels.len() as Real
    }

    /// The integer bounding box extents of this set, in voxels per axis.
    pub fn bb_extents(&self) -> [u32; 3] {
        let mut result = [0; 3];
        for i in 0..3 {
            result[i] = self.max_bb[i] - self.min_bb[i] + 1;
        }
        result
    }

    /// The minimal corner of the integer bounding box.
    pub fn min_bb(&self) -> [u32; 3] {
        self.min_bb
    }

    /// The maximal corner of the integer bounding box.
    pub fn max_bb(&self) -> [u32; 3] {
        self.max_bb
    }

    /// The mean of the voxel coordinates, per axis.
    pub fn centroid(&self) -> Vector {
        let mut center = Vector::zeros();
        if self.voxels.is_empty() {
            return center;
        }

        let denom = 1.0 / self.voxels.len() as Real;
        for voxel in &self.voxels {
            for i in 0..3 {
                center[i] += voxel.coords[i] as Real * denom;
            }
        }

        center
    }

    fn compute_bb(&mut self) {
        if self.voxels.is_empty() {
            self.min_bb = [0; 3];
            self.max_bb = [0; 3];
            return;
        }

        self.min_bb = self.voxels[0].coords;
        self.max_bb = self.voxels[0].coords;

        for voxel in &self.voxels {
            for i in 0..3 {
                self.min_bb[i] = self.min_bb[i].min(voxel.coords[i]);
                self.max_bb[i] = self.max_bb[i].max(voxel.coords[i]);
            }
        }
    }

    /// The world-space center of a voxel.
    pub fn voxel_center(&self, voxel: &Voxel) -> Point {
        self.origin
            + Vector::new(
                voxel.coords[0] as Real,
                voxel.coords[1] as Real,
                voxel.coords[2] as Real,
            ) * self.scale
    }

    /// Passes the eight world-space corners of a voxel to `f`.
    pub fn map_voxel_corners(&self, voxel: &Voxel, mut f: impl FnMut(Point)) {
        let center = self.voxel_center(voxel);
        let h = self.scale / 2.0;

        for dx in [-h, h] {
            for dy in [-h, h] {
                for dz in [-h, h] {
                    f(center + Vector::new(dx, dy, dz));
                }
            }
        }
    }

    /// The world-space corner points of every surface voxel. This is the
    /// point cloud convex hulls are fitted to.
    pub fn surface_corner_points(&self) -> Vec<Point> {
        let mut points = Vec::new();

        for voxel in self.voxels.iter().filter(|v| v.is_on_surface) {
            self.map_voxel_corners(voxel, |p| points.push(p));
        }

        // A fully interior set (possible after aggressive clipping) still
        // needs a hull; fall back to every voxel.
        if points.is_empty() {
            for voxel in &self.voxels {
                self.map_voxel_corners(voxel, |p| points.push(p));
            }
        }

        points
    }

    /// Splits this set in two along `plane`.
    ///
    /// Voxels within one voxel of the cut become surface voxels of their
    /// respective half, so the fitted hulls cover the cut face.
    pub fn clip(&self, plane: &CutPlane) -> (VoxelSet, VoxelSet) {
        let mut negative = Self {
            origin: self.origin,
            scale: self.scale,
            min_bb: [0; 3],
            max_bb: [0; 3],
            voxels: Vec::with_capacity(self.voxels.len() / 2),
            tri_refs: self.tri_refs.clone(),
        };
        let mut positive = negative.clone();

        for voxel in &self.voxels {
            let mut voxel = *voxel;
            let d = voxel.coords[plane.axis] as Real - plane.offset;

            if d.abs() <= 1.0 {
                voxel.is_on_surface = true;
            }

            if d < 0.0 {
                negative.voxels.push(voxel);
            } else {
                positive.voxels.push(voxel);
            }
        }

        negative.compute_bb();
        positive.compute_bb();

        (negative, positive)
    }
}
