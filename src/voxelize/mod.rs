//! Mesh rasterization into a voxel grid, inside/outside classification,
//! and the sparse voxel sets manipulated by the decomposer.

pub use self::grid::{TriangleRefs, VoxelGrid, VoxelLabel};
pub use self::voxel_set::{CutPlane, Voxel, VoxelSet};

pub(crate) use self::tri_box::triangle_intersects_box;

pub mod classify;

mod grid;
mod tri_box;
mod voxel_set;
