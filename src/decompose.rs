//! The recursive evaluate/split loop at the heart of the decomposition.

use std::sync::atomic::{AtomicBool, Ordering};

use ordered_float::OrderedFloat;

use crate::errors::DecompError;
use crate::hull::HullMesh;
use crate::math::Real;
use crate::params::Params;
use crate::voxelize::{CutPlane, VoxelSet};

/// A voxel cluster awaiting evaluation.
struct Cluster {
    voxels: VoxelSet,
    depth: u32,
}

/// The volume error of a cluster against its fitted hull, in percent.
///
/// Degenerate hulls (zero volume) cannot be improved by splitting, so they
/// report a zero error.
fn volume_error_pct(cluster_volume: Real, hull_volume: Real) -> Real {
    if hull_volume <= 0.0 {
        0.0
    } else {
        (1.0 - cluster_volume / hull_volume) * 100.0
    }
}

fn fit_hull(voxels: &VoxelSet, params: &Params) -> HullMesh {
    HullMesh::compute(&voxels.surface_corner_points(), params.max_num_vertices_per_ch)
}

/// Splits `root` recursively until every remaining cluster is convex
/// enough, then returns the terminal clusters' hulls.
///
/// The cancellation flag is checked once per popped cluster; an in-flight
/// hull fit always completes before the cancellation takes effect.
pub(crate) fn decompose(
    root: VoxelSet,
    params: &Params,
    cancel: &AtomicBool,
) -> Result<Vec<HullMesh>, DecompError> {
    let mut stack = vec![Cluster {
        voxels: root,
        depth: 0,
    }];
    let mut terminal = Vec::new();

    while let Some(cluster) = stack.pop() {
        if cancel.load(Ordering::Relaxed) {
            return Err(DecompError::Cancelled);
        }

        if cluster.voxels.is_empty() {
            continue;
        }

        let hull = fit_hull(&cluster.voxels, params);
        let cluster_volume = cluster.voxels.compute_volume();
        let error_pct = volume_error_pct(cluster_volume, hull.volume());

        let min_extent = cluster.voxels.bb_extents().into_iter().min().unwrap_or(0);

        // Depth and size limits override the error tolerance, which bounds
        // the recursion on adversarial geometry.
        let accept = error_pct <= params.min_volume_percent_error_allowed
            || cluster.depth >= params.max_recursion_depth
            || min_extent < params.min_edge_length;

        if accept {
            log::trace!(
                "accepted cluster at depth {} ({} voxels, {:.3}% error)",
                cluster.depth,
                cluster.voxels.len(),
                error_pct,
            );
            terminal.push(hull);
            continue;
        }

        let plane = if params.find_best_plane {
            best_plane(&cluster.voxels, params)
        } else {
            centroid_plane(&cluster.voxels)
        };

        let (negative, positive) = cluster.voxels.clip(&plane);

        if negative.is_empty() || positive.is_empty() {
            // The cut failed to separate anything; accept rather than
            // looping on the same cluster forever.
            terminal.push(hull);
            continue;
        }

        log::trace!(
            "split cluster at depth {} along axis {} at offset {:.2} ({} | {} voxels)",
            cluster.depth,
            plane.axis,
            plane.offset,
            negative.len(),
            positive.len(),
        );

        stack.push(Cluster {
            voxels: negative,
            depth: cluster.depth + 1,
        });
        stack.push(Cluster {
            voxels: positive,
            depth: cluster.depth + 1,
        });
    }

    log::debug!("decomposition produced {} terminal clusters", terminal.len());

    Ok(terminal)
}

/// The fast splitting heuristic: cut through the voxel centroid, orthogonal
/// to the longest axis of the cluster's bounding box.
fn centroid_plane(voxels: &VoxelSet) -> CutPlane {
    let extents = voxels.bb_extents();
    let axis = (0..3).max_by_key(|&i| extents[i]).unwrap_or(0);

    CutPlane {
        axis,
        offset: voxels.centroid()[axis],
    }
}

/// The exhaustive plane search: every axis, every integer offset across the
/// cluster's bounding box, scored by the sum of both child hulls' volume
/// errors. Ties prefer the plane closest to the centroid, then the lower
/// axis.
fn best_plane(voxels: &VoxelSet, params: &Params) -> CutPlane {
    let min_bb = voxels.min_bb();
    let max_bb = voxels.max_bb();
    let centroid = voxels.centroid();

    let mut best = centroid_plane(voxels);
    let mut best_score = (
        OrderedFloat(Real::INFINITY),
        OrderedFloat(Real::INFINITY),
        usize::MAX,
    );

    for axis in 0..3 {
        for i in min_bb[axis]..max_bb[axis] {
            let plane = CutPlane {
                axis,
                offset: i as Real + 0.5,
            };

            let (negative, positive) = voxels.clip(&plane);
            if negative.is_empty() || positive.is_empty() {
                continue;
            }

            let neg_hull = fit_hull(&negative, params);
            let pos_hull = fit_hull(&positive, params);
            let cost = volume_error_pct(negative.compute_volume(), neg_hull.volume())
                + volume_error_pct(positive.compute_volume(), pos_hull.volume());

            let score = (
                OrderedFloat(cost),
                OrderedFloat((plane.offset - centroid[axis]).abs()),
                axis,
            );

            if score < best_score {
                best_score = score;
                best = plane;
            }
        }
    }

    best
}
