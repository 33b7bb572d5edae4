//! Assembles the final result set: hull-budget merging, shrink wrapping,
//! and id assignment.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use ordered_float::OrderedFloat;

use crate::bounding_volume::Aabb;
use crate::errors::DecompError;
use crate::hull::HullMesh;
use crate::math::{Point, Real};
use crate::mesh::TriMeshData;
use crate::params::Params;
use crate::query;
use crate::voxelize::TriangleRefs;

/// One convex part of a finished decomposition.
///
/// Immutable once emitted; the derived fields (`volume`, `center`, `aabb`)
/// always describe the mesh stored in `points` and `triangles`.
#[derive(Clone, Debug)]
pub struct ConvexHull {
    /// The hull vertices.
    pub points: Vec<Point>,
    /// The hull faces, wound counter-clockwise seen from outside.
    pub triangles: Vec<[u32; 3]>,
    /// The enclosed volume.
    pub volume: Real,
    /// The volume centroid.
    pub center: Point,
    /// The id of this hull within its result set, assigned sequentially
    /// from zero.
    pub mesh_id: u32,
    /// The bounding box of the hull vertices.
    pub aabb: Aabb,
}

impl ConvexHull {
    pub(crate) fn from_mesh(mesh: HullMesh, mesh_id: u32) -> Self {
        let (volume, center) = mesh.volume_and_centroid();
        let aabb = mesh.aabb();

        Self {
            points: mesh.points,
            triangles: mesh.triangles,
            volume,
            center,
            mesh_id,
            aabb,
        }
    }
}

/// Turns the decomposer's terminal hulls into the final result set:
/// merges down to the hull budget, optionally shrink-wraps every hull
/// onto the source surface, then assigns sequential ids.
pub(crate) fn aggregate(
    mut hulls: Vec<HullMesh>,
    mesh: &TriMeshData,
    origin: Point,
    scale: Real,
    tri_refs: &TriangleRefs,
    params: &Params,
    cancel: &AtomicBool,
) -> Result<Vec<ConvexHull>, DecompError> {
    hulls.retain(|h| !h.points.is_empty());

    merge_to_budget(&mut hulls, params, cancel)?;

    if params.shrink_wrap {
        for hull in &mut hulls {
            if cancel.load(Ordering::Relaxed) {
                return Err(DecompError::Cancelled);
            }
            shrink_wrap(hull, mesh, origin, scale, tri_refs);
        }
    }

    log::debug!("aggregated {} convex hulls", hulls.len());

    Ok(hulls
        .into_iter()
        .enumerate()
        .map(|(id, hull)| ConvexHull::from_mesh(hull, id as u32))
        .collect())
}

fn combined_hull(a: &HullMesh, b: &HullMesh, max_vertices: u32) -> HullMesh {
    let mut points = a.points.clone();
    points.extend_from_slice(&b.points);
    HullMesh::compute(&points, max_vertices)
}

/// The volume wasted by replacing `a` and `b` with their combined hull.
fn merge_cost(a: &HullMesh, b: &HullMesh, vol_a: Real, vol_b: Real, params: &Params) -> Real {
    combined_hull(a, b, params.max_num_vertices_per_ch).volume() - vol_a - vol_b
}

/// Greedily merges the pair wasting the least volume until the hull count
/// fits the budget. Ties go to the lower pair ids, so the merge order is
/// deterministic.
fn merge_to_budget(
    hulls: &mut Vec<HullMesh>,
    params: &Params,
    cancel: &AtomicBool,
) -> Result<(), DecompError> {
    let budget = params.max_convex_hulls.max(1) as usize;
    if hulls.len() <= budget {
        return Ok(());
    }

    let n = hulls.len();
    let mut parts: Vec<Option<HullMesh>> = hulls.drain(..).map(Some).collect();
    let mut volumes: Vec<Real> = parts
        .iter()
        .map(|p| p.as_ref().map(|h| h.volume()).unwrap_or(0.0))
        .collect();

    // Pairwise cost matrix, upper triangle only. Merged slots get their
    // row and column refreshed; dead slots are tombstoned in `parts`.
    let mut cost = vec![Real::INFINITY; n * n];
    for i in 0..n {
        if cancel.load(Ordering::Relaxed) {
            return Err(DecompError::Cancelled);
        }
        for j in (i + 1)..n {
            if let (Some(a), Some(b)) = (&parts[i], &parts[j]) {
                cost[i * n + j] = merge_cost(a, b, volumes[i], volumes[j], params);
            }
        }
    }

    let mut alive = n;
    while alive > budget {
        if cancel.load(Ordering::Relaxed) {
            return Err(DecompError::Cancelled);
        }

        let mut best = None;
        let mut best_key = (OrderedFloat(Real::INFINITY), usize::MAX, usize::MAX);
        for i in 0..n {
            if parts[i].is_none() {
                continue;
            }
            for j in (i + 1)..n {
                if parts[j].is_none() {
                    continue;
                }
                let key = (OrderedFloat(cost[i * n + j]), i, j);
                if key < best_key {
                    best_key = key;
                    best = Some((i, j));
                }
            }
        }

        let Some((i, j)) = best else { break };

        let merged = match (&parts[i], &parts[j]) {
            (Some(a), Some(b)) => combined_hull(a, b, params.max_num_vertices_per_ch),
            _ => break,
        };

        log::trace!(
            "merged hulls {i} and {j} (wasted volume: {:.6})",
            merged.volume() - volumes[i] - volumes[j],
        );

        volumes[i] = merged.volume();
        parts[i] = Some(merged);
        parts[j] = None;
        alive -= 1;

        for k in 0..n {
            if k == i || parts[k].is_none() {
                continue;
            }
            let (lo, hi) = (k.min(i), k.max(i));
            if let (Some(a), Some(b)) = (&parts[lo], &parts[hi]) {
                cost[lo * n + hi] = merge_cost(a, b, volumes[lo], volumes[hi], params);
            }
        }
    }

    *hulls = parts.into_iter().flatten().collect();
    Ok(())
}

/// Projects every hull vertex onto the closest point of the source mesh
/// surface.
///
/// Hull vertices are voxel corners, so the triangles that rasterized into
/// the surrounding boundary cells are tried first; a vertex with no nearby
/// boundary cell (possible after merging) falls back to scanning the whole
/// mesh.
fn shrink_wrap(
    hull: &mut HullMesh,
    mesh: &TriMeshData,
    origin: Point,
    scale: Real,
    tri_refs: &TriangleRefs,
) {
    let inv_scale = 1.0 / scale;

    for pt in &mut hull.points {
        let grid = (*pt - origin) * inv_scale;

        let mut candidates = Vec::new();
        let mut seen = HashSet::new();
        for di in -1i64..=1 {
            for dj in -1i64..=1 {
                for dk in -1i64..=1 {
                    let cell = [
                        grid.x.round() as i64 + di,
                        grid.y.round() as i64 + dj,
                        grid.z.round() as i64 + dk,
                    ];
                    if cell.iter().any(|&c| c < 0) {
                        continue;
                    }
                    let coords = [cell[0] as u32, cell[1] as u32, cell[2] as u32];
                    for &tid in tri_refs.triangles_at(coords) {
                        if seen.insert(tid) {
                            candidates.push(tid);
                        }
                    }
                }
            }
        }

        *pt = if candidates.is_empty() {
            project_on_mesh(pt, mesh, 0..mesh.triangles.len() as u32)
        } else {
            project_on_mesh(pt, mesh, candidates.into_iter())
        };
    }
}

fn project_on_mesh(pt: &Point, mesh: &TriMeshData, tids: impl Iterator<Item = u32>) -> Point {
    let mut best = *pt;
    let mut best_sq_dist = Real::INFINITY;

    for tid in tids {
        let [a, b, c] = mesh.triangle(tid as usize);
        let q = query::closest_point_on_triangle(pt, &a, &b, &c);
        let sq_dist = (*pt - q).norm_squared();
        if sq_dist < best_sq_dist {
            best_sq_dist = sq_dist;
            best = q;
        }
    }

    best
}
