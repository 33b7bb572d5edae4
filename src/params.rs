//! Decomposition parameters.

use crate::math::Real;

/// Strategy used to label voxels as inside or outside the solid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Flood-fills "outside" from the grid boundary; everything left becomes
    /// "inside". Meshes with holes leak and produce hollow results.
    #[default]
    FloodFill,
    /// Only the surface voxels are considered solid. Produces hollow shells.
    SurfaceOnly,
    /// Classifies interior voxels by ray-crossing parity against the source
    /// triangles. More robust to small holes than flood filling, and more
    /// expensive.
    RaycastFill,
}

/// Configuration of a decomposition run.
///
/// Every field has a default, so partial configuration goes through struct
/// update syntax:
///
/// ```
/// use voxacd::Params;
///
/// let params = Params {
///     max_convex_hulls: 16,
///     ..Params::default()
/// };
/// assert_eq!(params.resolution, 400_000);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// The maximum number of convex hulls to produce.
    pub max_convex_hulls: u32,
    /// Target number of voxels of the rasterization grid.
    pub resolution: u32,
    /// A cluster is accepted as-is once its voxel volume is within this
    /// percentage of its convex hull volume.
    pub min_volume_percent_error_allowed: Real,
    /// The maximum splitting recursion depth.
    pub max_recursion_depth: u32,
    /// Project the output hull vertices onto the source mesh surface.
    pub shrink_wrap: bool,
    /// How the interior of the voxelized mesh is filled.
    pub fill_mode: FillMode,
    /// The maximum number of vertices of each output convex hull.
    pub max_num_vertices_per_ch: u32,
    /// Run the decomposition on a background worker thread.
    pub async_acd: bool,
    /// A voxel cluster is never split further once its bounding box is
    /// smaller than this edge length (in voxels) along every axis.
    pub min_edge_length: u32,
    /// Search exhaustively for the best splitting plane instead of cutting
    /// through the centroid along the longest axis. Slower, more accurate.
    pub find_best_plane: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_convex_hulls: 64,
            resolution: 400_000,
            min_volume_percent_error_allowed: 1.0,
            max_recursion_depth: 10,
            shrink_wrap: true,
            fill_mode: FillMode::default(),
            max_num_vertices_per_ch: 64,
            async_acd: true,
            min_edge_length: 2,
            find_best_plane: false,
        }
    }
}
