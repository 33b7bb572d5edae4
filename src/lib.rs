/*!
voxacd
======

**voxacd** approximates an arbitrary closed triangle mesh by a small set of
convex hulls whose union closely covers the volume of the original solid.
The input mesh is rasterized into a voxel grid, the grid is labeled
inside/outside, and the resulting voxel cloud is split recursively until every
part is convex enough, merged back under a hull-count budget, and optionally
shrink-wrapped onto the source surface.

The entry point is [`Decomposer`], which runs the pipeline either on the
calling thread or on a background worker with cooperative cancellation:

```
use voxacd::{Decomposer, Params};

let (points, triangles) = voxacd::shapes::cuboid([0.0; 3], [1.0, 1.0, 1.0]);
let mut decomposer = Decomposer::new(false);
decomposer
    .compute(&points, &triangles, &Params::default())
    .unwrap();
assert_eq!(decomposer.hull_count().unwrap(), 1);
```
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_range_contains)]

pub extern crate nalgebra as na;

pub mod bounding_volume;
pub mod errors;
pub mod hull;
pub mod math;
pub mod mesh;
pub mod params;
pub mod query;
pub mod shapes;
pub mod voxelize;

mod aggregate;
mod decompose;
mod engine;

pub use crate::aggregate::ConvexHull;
pub use crate::bounding_volume::Aabb;
pub use crate::errors::DecompError;
pub use crate::engine::{Decomposer, RunStatus};
pub use crate::params::{FillMode, Params};
