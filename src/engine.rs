//! The execution controller tying the pipeline stages together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;

use crate::aggregate::{self, ConvexHull};
use crate::decompose;
use crate::errors::DecompError;
use crate::math::{Point, Real};
use crate::mesh::TriMeshData;
use crate::params::Params;
use crate::query;
use crate::voxelize::{classify, VoxelGrid, VoxelSet};

/// The lifecycle stage of a [`Decomposer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// No decomposition has been started yet.
    Idle,
    /// A decomposition is in flight.
    Running,
    /// The last decomposition completed; its hulls can be queried.
    Ready,
    /// The last decomposition was cancelled; no results are available.
    Cancelled,
}

struct RunState {
    status: RunStatus,
    hulls: Arc<Vec<ConvexHull>>,
}

struct Shared {
    cancel: AtomicBool,
    state: Mutex<RunState>,
    completed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, RunState> {
        // A worker panic mid-run leaves the state Running; queries then
        // keep reporting NotReady, which is accurate enough.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Runs the full decomposition pipeline, either on the calling thread or
/// on a background worker.
///
/// One run at a time: calling [`compute`](Decomposer::compute) while a
/// run is in flight fails with [`DecompError::Busy`]. Results become
/// immutable once a run completes and stay available until the next
/// `compute` call.
pub struct Decomposer {
    asynchronous: bool,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Default for Decomposer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Decomposer {
    /// Creates a decomposer. With `asynchronous`, `compute` returns
    /// immediately and the pipeline runs on a worker thread; otherwise
    /// `compute` blocks until the run finishes.
    pub fn new(asynchronous: bool) -> Self {
        Self {
            asynchronous,
            shared: Arc::new(Shared {
                cancel: AtomicBool::new(false),
                state: Mutex::new(RunState {
                    status: RunStatus::Idle,
                    hulls: Arc::new(Vec::new()),
                }),
                completed: Condvar::new(),
            }),
            worker: None,
        }
    }

    /// Starts a decomposition of the given indexed triangle mesh.
    ///
    /// `points` is a flat `x0 y0 z0 x1 y1 z1 …` buffer, `triangles` a flat
    /// buffer of three vertex indices per triangle. Validation errors are
    /// reported eagerly from the calling thread, in both modes.
    pub fn compute(
        &mut self,
        points: &[Real],
        triangles: &[u32],
        params: &Params,
    ) -> Result<(), DecompError> {
        let mesh = TriMeshData::from_f64(points, triangles)?;
        self.compute_mesh(mesh, params)
    }

    /// Single-precision variant of [`compute`](Decomposer::compute). The
    /// pipeline itself always runs in double precision.
    pub fn compute_f32(
        &mut self,
        points: &[f32],
        triangles: &[u32],
        params: &Params,
    ) -> Result<(), DecompError> {
        let mesh = TriMeshData::from_f32(points, triangles)?;
        self.compute_mesh(mesh, params)
    }

    fn compute_mesh(&mut self, mesh: TriMeshData, params: &Params) -> Result<(), DecompError> {
        {
            let mut state = self.shared.lock();
            if state.status == RunStatus::Running {
                return Err(DecompError::Busy);
            }
            state.status = RunStatus::Running;
            state.hulls = Arc::new(Vec::new());
        }
        self.shared.cancel.store(false, Ordering::Relaxed);

        // The previous worker, if any, has finished by now.
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        let params = params.clone();

        if self.asynchronous && params.async_acd {
            let shared = self.shared.clone();
            self.worker = Some(std::thread::spawn(move || {
                run_pipeline(&shared, &mesh, &params);
            }));
        } else {
            run_pipeline(&self.shared, &mesh, &params);
        }

        Ok(())
    }

    /// Requests cancellation of the in-flight run. The worker notices at
    /// the next checkpoint; [`wait`](Decomposer::wait) observes the
    /// terminal `Cancelled` status.
    pub fn cancel(&self) {
        self.shared.cancel.store(true, Ordering::Relaxed);
    }

    /// The current lifecycle stage.
    pub fn status(&self) -> RunStatus {
        self.shared.lock().status
    }

    /// Did the last run complete with results available?
    pub fn is_ready(&self) -> bool {
        self.status() == RunStatus::Ready
    }

    /// Blocks until no run is in flight.
    pub fn wait(&self) {
        let mut state = self.shared.lock();
        while state.status == RunStatus::Running {
            state = self
                .shared
                .completed
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// The number of hulls produced by the finished run.
    pub fn hull_count(&self) -> Result<u32, DecompError> {
        Ok(self.results()?.len() as u32)
    }

    /// A copy of the hull at `index` in the finished result set.
    pub fn hull(&self, index: u32) -> Result<ConvexHull, DecompError> {
        let hulls = self.results()?;
        hulls
            .get(index as usize)
            .cloned()
            .ok_or(DecompError::OutOfRange {
                index,
                len: hulls.len() as u32,
            })
    }

    /// The finished result set, shared without copying.
    pub fn hulls(&self) -> Result<Arc<Vec<ConvexHull>>, DecompError> {
        self.results()
    }

    /// The id of the hull closest to `pt`, and the distance to it (zero
    /// when `pt` lies inside that hull).
    pub fn find_nearest_hull(&self, pt: &Point) -> Result<(u32, Real), DecompError> {
        let hulls = self.results()?;
        // A finished run over validated input always has at least one hull.
        query::find_nearest_hull(&hulls, pt).ok_or(DecompError::OutOfRange { index: 0, len: 0 })
    }

    fn results(&self) -> Result<Arc<Vec<ConvexHull>>, DecompError> {
        let state = self.shared.lock();
        match state.status {
            RunStatus::Ready => Ok(state.hulls.clone()),
            RunStatus::Cancelled => Err(DecompError::Cancelled),
            RunStatus::Idle | RunStatus::Running => Err(DecompError::NotReady),
        }
    }
}

impl Drop for Decomposer {
    fn drop(&mut self) {
        self.shared.cancel.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_pipeline(shared: &Shared, mesh: &TriMeshData, params: &Params) {
    let result = execute(&shared.cancel, mesh, params);

    let mut state = shared.lock();
    match result {
        Ok(hulls) => {
            log::debug!("decomposition finished with {} hulls", hulls.len());
            state.hulls = Arc::new(hulls);
            state.status = RunStatus::Ready;
        }
        Err(_) => {
            log::debug!("decomposition cancelled");
            state.status = RunStatus::Cancelled;
        }
    }
    drop(state);
    shared.completed.notify_all();
}

fn execute(
    cancel: &AtomicBool,
    mesh: &TriMeshData,
    params: &Params,
) -> Result<Vec<ConvexHull>, DecompError> {
    let mut grid = VoxelGrid::rasterize(mesh, params.resolution);
    classify::classify(&mut grid, mesh, params.fill_mode);

    if cancel.load(Ordering::Relaxed) {
        return Err(DecompError::Cancelled);
    }

    let root = VoxelSet::from_grid(&mut grid);
    drop(grid);

    let origin = root.origin();
    let scale = root.scale();
    let tri_refs = root.tri_refs().clone();

    let raw = decompose::decompose(root, params, cancel)?;
    aggregate::aggregate(raw, mesh, origin, scale, &tri_refs, params, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes;

    #[test]
    fn queries_before_compute_are_not_ready() {
        let decomposer = Decomposer::new(false);
        assert_eq!(decomposer.status(), RunStatus::Idle);
        assert!(!decomposer.is_ready());
        assert_eq!(decomposer.hull_count(), Err(DecompError::NotReady));
        assert_eq!(
            decomposer.find_nearest_hull(&Point::origin()),
            Err(DecompError::NotReady)
        );
    }

    #[test]
    fn synchronous_compute_of_a_cube() {
        let (points, triangles) = shapes::cuboid([0.0; 3], [1.0; 3]);
        let mut decomposer = Decomposer::new(false);
        decomposer
            .compute(&points, &triangles, &Params::default())
            .unwrap();

        assert!(decomposer.is_ready());
        assert_eq!(decomposer.hull_count().unwrap(), 1);

        let hull = decomposer.hull(0).unwrap();
        assert_eq!(hull.mesh_id, 0);
        assert!(hull.volume > 0.9 && hull.volume < 1.1, "volume: {}", hull.volume);
    }

    #[test]
    fn out_of_range_hull_indices_are_rejected() {
        let (points, triangles) = shapes::cuboid([0.0; 3], [1.0; 3]);
        let mut decomposer = Decomposer::new(false);
        decomposer
            .compute(&points, &triangles, &Params::default())
            .unwrap();

        let count = decomposer.hull_count().unwrap();
        assert_eq!(
            decomposer.hull(count).unwrap_err(),
            DecompError::OutOfRange {
                index: count,
                len: count
            }
        );
    }

    #[test]
    fn validation_errors_are_eager_in_async_mode() {
        let mut decomposer = Decomposer::new(true);
        let result = decomposer.compute(&[], &[], &Params::default());
        assert_eq!(result, Err(DecompError::EmptyPoints));
        assert_eq!(decomposer.status(), RunStatus::Idle);
    }

    #[test]
    fn results_survive_until_the_next_run() {
        let (points, triangles) = shapes::cuboid([0.0; 3], [1.0; 3]);
        let mut decomposer = Decomposer::new(false);
        decomposer
            .compute(&points, &triangles, &Params::default())
            .unwrap();
        let first = decomposer.hulls().unwrap();

        decomposer
            .compute(&points, &triangles, &Params::default())
            .unwrap();
        let second = decomposer.hulls().unwrap();

        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].points, second[0].points);
    }
}
