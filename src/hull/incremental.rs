//! Incremental 3D convex hull construction.
//!
//! Points are inserted furthest-first with per-face conflict lists, so the
//! cost of huge voxel-corner clouds stays proportional to the number of
//! actual hull vertices. The same mechanism implements the per-hull vertex
//! budget: construction simply stops adding vertices once the budget is
//! reached, which drops the least significant vertices first.

use std::collections::HashSet;

use crate::hull::HullMesh;
use crate::math::{Point, Real, Vector};

struct Face {
    pts: [usize; 3],
    normal: Vector,
    d: Real,
    valid: bool,
    // Input points strictly outside this face, each assigned to exactly
    // one face.
    visible: Vec<usize>,
}

impl Face {
    fn signed_distance(&self, pt: &Point) -> Real {
        self.normal.dot(&pt.coords) - self.d
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.pts;
        [(a, b), (b, c), (c, a)]
    }
}

/// Computes the convex hull of `points`, using at most `max_vertices` hull
/// vertices.
///
/// Degenerate inputs (all points coincident, collinear, or coplanar) yield
/// a minimal point, segment, or triangle hull with no enclosed volume.
pub(crate) fn convex_hull(points: &[Point], max_vertices: u32) -> HullMesh {
    let max_vertices = (max_vertices.max(4)) as usize;

    if points.is_empty() {
        return HullMesh::default();
    }

    let diag = {
        let aabb = crate::bounding_volume::Aabb::from_points(points);
        aabb.extents().norm()
    };
    let eps = (diag * 1.0e-9).max(Real::MIN_POSITIVE);

    // Initial simplex from extreme points; every degenerate early-out
    // returns a minimal hull instead of failing.
    let i0 = lexicographic_min(points);

    let i1 = match furthest_from(points, |p| (p - points[i0]).norm(), eps) {
        Some(i) => i,
        None => return HullMesh::single_point(points[i0]),
    };

    let axis = (points[i1] - points[i0]).normalize();
    let i2 = match furthest_from(
        points,
        |p| {
            let v = p - points[i0];
            (v - axis * v.dot(&axis)).norm()
        },
        eps,
    ) {
        Some(i) => i,
        None => return HullMesh::segment(points[i0], points[i1]),
    };

    let normal = (points[i1] - points[i0])
        .cross(&(points[i2] - points[i0]))
        .normalize();
    let i3 = match furthest_from(points, |p| normal.dot(&(p - points[i0])).abs(), eps) {
        Some(i) => i,
        None => return HullMesh::triangle(points[i0], points[i1], points[i2]),
    };

    let interior = Point::from(
        (points[i0].coords + points[i1].coords + points[i2].coords + points[i3].coords) / 4.0,
    );

    let mut faces = Vec::new();
    for pts in [[i0, i1, i2], [i0, i1, i3], [i0, i2, i3], [i1, i2, i3]] {
        match make_face(points, pts, &interior, eps) {
            Some(face) => faces.push(face),
            // Cannot happen after the degeneracy early-outs above, but a
            // flat simplex is still a usable triangle hull.
            None => return HullMesh::triangle(points[i0], points[i1], points[i2]),
        }
    }

    // Assign every remaining point to the face it is furthest outside of.
    let simplex = [i0, i1, i2, i3];
    for (id, pt) in points.iter().enumerate() {
        if simplex.contains(&id) {
            continue;
        }
        assign_to_best_face(&mut faces, id, pt, eps);
    }

    let mut num_vertices = 4;

    'insertion: loop {
        if num_vertices >= max_vertices {
            break;
        }

        // The lowest-index face with pending conflict points; scanning in
        // face order keeps the construction deterministic.
        let Some(face_id) = faces
            .iter()
            .position(|f| f.valid && !f.visible.is_empty())
        else {
            break;
        };

        let point_id = {
            let face = &faces[face_id];
            let mut best = face.visible[0];
            let mut best_dist = face.signed_distance(&points[best]);
            for &id in &face.visible[1..] {
                let dist = face.signed_distance(&points[id]);
                if dist > best_dist {
                    best = id;
                    best_dist = dist;
                }
            }
            best
        };
        let point = points[point_id];

        let visible_ids: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.valid && f.signed_distance(&point) > eps)
            .map(|(id, _)| id)
            .collect();

        let visible_edges: HashSet<(usize, usize)> = visible_ids
            .iter()
            .flat_map(|&id| faces[id].edges())
            .collect();

        let horizon: Vec<(usize, usize)> = visible_ids
            .iter()
            .flat_map(|&id| faces[id].edges())
            .filter(|&(a, b)| !visible_edges.contains(&(b, a)))
            .collect();

        // Build the replacement cone up-front; if any of its faces would be
        // degenerate, the point is too close to the surface to matter.
        let mut cone = Vec::with_capacity(horizon.len());
        for &(a, b) in &horizon {
            match make_face(points, [a, b, point_id], &interior, eps) {
                Some(face) => cone.push(face),
                None => {
                    drop_conflict_point(&mut faces[face_id], point_id);
                    continue 'insertion;
                }
            }
        }

        if cone.is_empty() {
            drop_conflict_point(&mut faces[face_id], point_id);
            continue 'insertion;
        }

        let mut orphans = Vec::new();
        for &id in &visible_ids {
            faces[id].valid = false;
            orphans.append(&mut faces[id].visible);
        }

        let first_new = faces.len();
        faces.append(&mut cone);

        for orphan in orphans {
            if orphan != point_id {
                assign_to_best_face(&mut faces[first_new..], orphan, &points[orphan], eps);
            }
        }

        num_vertices += 1;
    }

    compact(points, &faces)
}

fn lexicographic_min(points: &[Point]) -> usize {
    let mut best = 0;
    for (id, pt) in points.iter().enumerate().skip(1) {
        let cur = &points[best];
        if (pt.x, pt.y, pt.z) < (cur.x, cur.y, cur.z) {
            best = id;
        }
    }
    best
}

fn furthest_from(points: &[Point], score: impl Fn(&Point) -> Real, eps: Real) -> Option<usize> {
    let mut best = None;
    let mut best_score = eps;

    for (id, pt) in points.iter().enumerate() {
        let s = score(pt);
        if s > best_score {
            best = Some(id);
            best_score = s;
        }
    }

    best
}

/// Builds a face wound so its normal points away from `interior`, or `None`
/// if the three points are (nearly) collinear.
fn make_face(points: &[Point], pts: [usize; 3], interior: &Point, eps: Real) -> Option<Face> {
    let [a, b, c] = pts;
    let normal = (points[b] - points[a]).cross(&(points[c] - points[a]));

    if normal.norm() <= eps * eps {
        return None;
    }

    let mut normal = normal.normalize();
    let mut pts = pts;
    let mut d = normal.dot(&points[a].coords);

    if normal.dot(&interior.coords) > d {
        pts.swap(1, 2);
        normal = -normal;
        d = -d;
    }

    Some(Face {
        pts,
        normal,
        d,
        valid: true,
        visible: Vec::new(),
    })
}

fn assign_to_best_face(faces: &mut [Face], id: usize, pt: &Point, eps: Real) {
    let mut best = None;
    let mut best_dist = eps;

    for (face_id, face) in faces.iter().enumerate() {
        if !face.valid {
            continue;
        }
        let dist = face.signed_distance(pt);
        if dist > best_dist {
            best = Some(face_id);
            best_dist = dist;
        }
    }

    if let Some(face_id) = best {
        faces[face_id].visible.push(id);
    }
}

fn drop_conflict_point(face: &mut Face, point_id: usize) {
    face.visible.retain(|&id| id != point_id);
}

/// Extracts the valid faces into a compact mesh, remapping vertex ids in
/// order of first appearance.
fn compact(points: &[Point], faces: &[Face]) -> HullMesh {
    let mut remap = vec![u32::MAX; points.len()];
    let mut out_points = Vec::new();
    let mut out_triangles = Vec::new();

    for face in faces.iter().filter(|f| f.valid) {
        let mut tri = [0u32; 3];
        for (i, &pt) in face.pts.iter().enumerate() {
            if remap[pt] == u32::MAX {
                remap[pt] = out_points.len() as u32;
                out_points.push(points[pt]);
            }
            tri[i] = remap[pt];
        }
        out_triangles.push(tri);
    }

    HullMesh {
        points: out_points,
        triangles: out_triangles,
    }
}
