//! End-to-end decomposition runs through the public API.

use voxacd::math::Point;
use voxacd::{shapes, DecompError, Decomposer, Params, RunStatus};

fn cube() -> (Vec<f64>, Vec<u32>) {
    shapes::cuboid([0.0; 3], [1.0, 1.0, 1.0])
}

/// Parameters that make a dumbbell run take long enough to be interrupted
/// reliably.
fn slow_params() -> Params {
    Params {
        find_best_plane: true,
        min_volume_percent_error_allowed: 0.01,
        max_recursion_depth: 12,
        ..Params::default()
    }
}

#[test]
fn a_convex_mesh_yields_a_single_hull() {
    let (points, triangles) = cube();
    let mut decomposer = Decomposer::new(false);
    decomposer
        .compute(&points, &triangles, &Params::default())
        .unwrap();

    assert_eq!(decomposer.status(), RunStatus::Ready);
    assert_eq!(decomposer.hull_count().unwrap(), 1);

    // Shrink wrapping pulls the voxel-inflated hull back onto the cube.
    let hull = decomposer.hull(0).unwrap();
    assert!(
        (hull.volume - 1.0).abs() < 0.05,
        "volume: {}",
        hull.volume
    );
    assert!(hull.aabb.mins.x > -1.0e-6 && hull.aabb.maxs.x < 1.0 + 1.0e-6);
}

#[test]
fn a_unit_cube_round_trips_with_a_budget_of_one() {
    let (points, triangles) = cube();
    let params = Params {
        max_convex_hulls: 1,
        ..Params::default()
    };

    let mut decomposer = Decomposer::new(false);
    decomposer.compute(&points, &triangles, &params).unwrap();

    assert_eq!(decomposer.hull_count().unwrap(), 1);
    let hull = decomposer.hull(0).unwrap();
    assert!(
        (hull.volume - 1.0).abs() < 0.05,
        "volume: {}",
        hull.volume
    );
}

#[test]
fn a_concave_mesh_yields_several_hulls() {
    let (points, triangles) = shapes::dumbbell();
    let mut decomposer = Decomposer::new(false);
    decomposer
        .compute(&points, &triangles, &Params::default())
        .unwrap();

    assert!(decomposer.hull_count().unwrap() >= 2);
}

#[test]
fn budgets_bound_the_result() {
    let (points, triangles) = shapes::dumbbell();
    let params = Params {
        max_convex_hulls: 2,
        max_num_vertices_per_ch: 16,
        min_volume_percent_error_allowed: 0.1,
        ..Params::default()
    };

    let mut decomposer = Decomposer::new(false);
    decomposer.compute(&points, &triangles, &params).unwrap();

    let count = decomposer.hull_count().unwrap();
    assert!(count >= 1 && count <= 2, "hull count: {count}");

    for i in 0..count {
        let hull = decomposer.hull(i).unwrap();
        assert!(
            hull.points.len() <= 16,
            "hull {i} has {} vertices",
            hull.points.len()
        );
        assert_eq!(hull.mesh_id, i);
    }
}

#[test]
fn identical_runs_are_identical() {
    let (points, triangles) = shapes::dumbbell();

    let run = || {
        let mut decomposer = Decomposer::new(false);
        decomposer
            .compute(&points, &triangles, &Params::default())
            .unwrap();
        decomposer.hulls().unwrap()
    };

    let first = run();
    let second = run();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.mesh_id, b.mesh_id);
        assert_eq!(a.points, b.points);
        assert_eq!(a.triangles, b.triangles);
        assert_eq!(a.volume, b.volume);
    }
}

#[test]
fn an_asynchronous_run_completes() {
    let (points, triangles) = cube();
    let mut decomposer = Decomposer::new(true);
    decomposer
        .compute(&points, &triangles, &Params::default())
        .unwrap();

    decomposer.wait();
    assert!(decomposer.is_ready());
    assert_eq!(decomposer.hull_count().unwrap(), 1);
}

#[test]
fn cancellation_is_terminal_for_the_run() {
    let (points, triangles) = shapes::dumbbell();
    let mut decomposer = Decomposer::new(true);
    decomposer
        .compute(&points, &triangles, &slow_params())
        .unwrap();

    decomposer.cancel();
    decomposer.wait();

    assert_eq!(decomposer.status(), RunStatus::Cancelled);
    assert_eq!(decomposer.hull_count().unwrap_err(), DecompError::Cancelled);
    assert_eq!(
        decomposer.find_nearest_hull(&Point::origin()).unwrap_err(),
        DecompError::Cancelled
    );

    // A cancelled decomposer accepts a fresh run.
    let (points, triangles) = cube();
    decomposer
        .compute(&points, &triangles, &Params::default())
        .unwrap();
    decomposer.wait();
    assert!(decomposer.is_ready());
}

#[test]
fn a_second_compute_while_running_is_rejected() {
    let (points, triangles) = shapes::dumbbell();
    let mut decomposer = Decomposer::new(true);
    decomposer
        .compute(&points, &triangles, &slow_params())
        .unwrap();

    let second = decomposer.compute(&points, &triangles, &Params::default());
    assert_eq!(second.unwrap_err(), DecompError::Busy);

    decomposer.cancel();
    decomposer.wait();
    assert_ne!(decomposer.status(), RunStatus::Running);
}

#[test]
fn nearest_hull_of_an_interior_point() {
    let (points, triangles) = shapes::dumbbell();
    let mut decomposer = Decomposer::new(false);
    decomposer
        .compute(&points, &triangles, &Params::default())
        .unwrap();

    // The center of the first cube lies inside exactly one hull.
    let (id, dist) = decomposer
        .find_nearest_hull(&Point::new(0.5, 0.5, 0.5))
        .unwrap();
    assert!(dist < 1.0e-6, "distance: {dist}");

    let hull = decomposer.hull(id).unwrap();
    assert!(hull.aabb.mins.x < 0.5 && hull.aabb.maxs.x > 0.5);
}

#[test]
fn query_errors_are_typed() {
    let decomposer = Decomposer::new(false);
    assert_eq!(decomposer.hull_count().unwrap_err(), DecompError::NotReady);
    assert_eq!(decomposer.hull(0).unwrap_err(), DecompError::NotReady);

    let (points, triangles) = cube();
    let mut decomposer = Decomposer::new(false);
    decomposer
        .compute(&points, &triangles, &Params::default())
        .unwrap();

    let count = decomposer.hull_count().unwrap();
    assert_eq!(
        decomposer.hull(count + 3).unwrap_err(),
        DecompError::OutOfRange {
            index: count + 3,
            len: count
        }
    );
}

#[test]
fn invalid_input_is_rejected_before_any_work() {
    let mut decomposer = Decomposer::new(true);

    let err = decomposer.compute(&[], &[0, 1, 2], &Params::default());
    assert_eq!(err.unwrap_err(), DecompError::EmptyPoints);

    let err = decomposer.compute(&[0.0, 0.0], &[0, 1, 2], &Params::default());
    assert_eq!(err.unwrap_err(), DecompError::MalformedPointBuffer(2));

    let (points, triangles) = cube();
    let err = decomposer.compute(&points, &triangles[..4], &Params::default());
    assert_eq!(err.unwrap_err(), DecompError::MalformedIndexBuffer(4));

    let err = decomposer.compute(&points, &[0, 1, 99], &Params::default());
    assert_eq!(
        err.unwrap_err(),
        DecompError::IndexOutOfBounds {
            triangle: 0,
            index: 99,
            num_points: 8
        }
    );

    assert_eq!(decomposer.status(), RunStatus::Idle);
}

#[test]
fn single_precision_input_matches_double_precision() {
    let (points, triangles) = cube();
    let points_f32: Vec<f32> = points.iter().map(|&c| c as f32).collect();

    let mut double = Decomposer::new(false);
    double
        .compute(&points, &triangles, &Params::default())
        .unwrap();

    let mut single = Decomposer::new(false);
    single
        .compute_f32(&points_f32, &triangles, &Params::default())
        .unwrap();

    assert_eq!(
        double.hull_count().unwrap(),
        single.hull_count().unwrap()
    );
}

#[test]
fn dropping_a_running_decomposer_joins_the_worker() {
    let (points, triangles) = shapes::dumbbell();
    let mut decomposer = Decomposer::new(true);
    decomposer
        .compute(&points, &triangles, &slow_params())
        .unwrap();
    drop(decomposer);
}
