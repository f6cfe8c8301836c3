//! Expanding polytope algorithm
//!
//! GJK proves overlap but does not quantify it; EPA expands the terminal
//! GJK simplex into a polytope whose closest face to the origin yields the
//! penetration depth, contact normal and contact point. The polytope is
//! expanded with the *rounded* support function, so sphere and capsule
//! radii are part of the surface being searched.

use super::gjk::{Simplex, SupportPoint};
use super::shape::ConvexShape;
use crate::foundation::math::{Iso, Vec3};

const EPSILON: f32 = 0.000001;

/// Maximum expansion iterations before giving up
const MAX_ITERATIONS: usize = 64;

/// Maximum faces in the polytope
const MAX_FACES: usize = 128;

/// Convergence tolerance on face-distance growth
const TOLERANCE: f32 = 0.0001;

/// Penetration information extracted by EPA
#[derive(Debug, Clone, Copy)]
pub struct Penetration {
    /// Contact normal, pointing from shape A toward shape B
    pub normal: Vec3,
    /// Penetration depth along the normal (non-negative)
    pub depth: f32,
    /// Contact point in world space
    pub point: Vec3,
}

/// A face of the expanding polytope
#[derive(Debug, Clone, Copy)]
struct Face {
    vertices: [usize; 3],
    normal: Vec3,
    distance: f32,
}

/// Rounded-surface support point of the Minkowski difference
fn rounded_minkowski_support(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    direction: &Vec3,
) -> SupportPoint {
    let on_a = shape_a.rounded_support(iso_a, direction);
    let on_b = shape_b.rounded_support(iso_b, &-direction);
    SupportPoint::from_supports(on_a, on_b)
}

/// Extract penetration depth, normal and contact point for overlapping shapes
///
/// `simplex` is GJK's terminal simplex; lower-dimensional simplices are
/// first expanded to a tetrahedron with axis-direction supports. Returns
/// `None` when no valid polytope can be built (degenerately thin shapes).
pub fn penetration(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    simplex: &Simplex,
) -> Option<Penetration> {
    let mut vertices: Vec<SupportPoint> = simplex.points().to_vec();

    // Expand a lower-dimensional seed to a tetrahedron
    if vertices.len() < 4 {
        let search_dirs = [
            Vec3::x(),
            Vec3::y(),
            Vec3::z(),
            -Vec3::x(),
            -Vec3::y(),
            -Vec3::z(),
        ];
        for dir in &search_dirs {
            if vertices.len() >= 4 {
                break;
            }
            let candidate = rounded_minkowski_support(shape_a, iso_a, shape_b, iso_b, dir);
            let is_new = vertices
                .iter()
                .all(|v| (v.w - candidate.w).norm_squared() > EPSILON);
            if is_new {
                vertices.push(candidate);
            }
        }
        if vertices.len() < 4 {
            log::warn!("epa: could not build a starting tetrahedron");
            return None;
        }
        vertices.truncate(4);
    }

    let mut faces: Vec<Face> = Vec::with_capacity(MAX_FACES);
    for indices in [[0, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]] {
        if let Some(face) = make_face(&vertices, indices) {
            faces.push(face);
        }
    }
    if faces.is_empty() {
        return None;
    }
    orient_outward(&vertices, &mut faces);

    for _ in 0..MAX_ITERATIONS {
        let closest_index = closest_face(&faces)?;
        let closest = faces[closest_index];

        let candidate =
            rounded_minkowski_support(shape_a, iso_a, shape_b, iso_b, &closest.normal);
        let growth = candidate.w.dot(&closest.normal) - closest.distance;
        if growth < TOLERANCE {
            return Some(resolve_contact(&vertices, &closest));
        }

        let new_index = vertices.len();
        vertices.push(candidate);

        // Remove every face that can see the new vertex, keeping the
        // horizon edges for re-triangulation
        let mut edges: Vec<(usize, usize)> = Vec::new();
        let mut i = 0;
        while i < faces.len() {
            let face = faces[i];
            let to_new = candidate.w - vertices[face.vertices[0]].w;
            if face.normal.dot(&to_new) > 0.0 {
                push_edge(&mut edges, face.vertices[0], face.vertices[1]);
                push_edge(&mut edges, face.vertices[1], face.vertices[2]);
                push_edge(&mut edges, face.vertices[2], face.vertices[0]);
                faces.swap_remove(i);
            } else {
                i += 1;
            }
        }

        for (v1, v2) in edges {
            if let Some(face) = make_face(&vertices, [new_index, v1, v2]) {
                faces.push(face);
            }
        }
        orient_outward(&vertices, &mut faces);

        if faces.len() > MAX_FACES {
            log::warn!("epa: face cap {MAX_FACES} exceeded, using best face so far");
            break;
        }
    }

    let closest_index = closest_face(&faces)?;
    Some(resolve_contact(&vertices, &faces[closest_index]))
}

/// Build a face from three vertex indices; `None` for degenerate triangles
fn make_face(vertices: &[SupportPoint], indices: [usize; 3]) -> Option<Face> {
    let a = vertices[indices[0]].w;
    let b = vertices[indices[1]].w;
    let c = vertices[indices[2]].w;

    let normal = (b - a).cross(&(c - a));
    let length = normal.norm();
    if length < EPSILON {
        return None;
    }

    let normal = normal / length;
    Some(Face {
        vertices: indices,
        normal,
        distance: a.dot(&normal),
    })
}

/// Flip faces so every normal points away from the polytope centroid
fn orient_outward(vertices: &[SupportPoint], faces: &mut [Face]) {
    let centroid: Vec3 =
        vertices.iter().map(|v| v.w).sum::<Vec3>() / vertices.len() as f32;

    for face in faces.iter_mut() {
        let to_centroid = centroid - vertices[face.vertices[0]].w;
        if face.normal.dot(&to_centroid) > 0.0 {
            face.normal = -face.normal;
            face.distance = -face.distance;
            face.vertices.swap(1, 2);
        }
    }
}

/// Index of the face closest to the origin
fn closest_face(faces: &[Face]) -> Option<usize> {
    faces
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.distance
                .abs()
                .partial_cmp(&b.distance.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

/// Add an edge, cancelling it if the reverse edge is already present
///
/// Shared edges belong to two removed faces and are interior; only the
/// horizon boundary survives.
fn push_edge(edges: &mut Vec<(usize, usize)>, v1: usize, v2: usize) {
    if let Some(i) = edges
        .iter()
        .position(|&(a, b)| (a == v2 && b == v1) || (a == v1 && b == v2))
    {
        edges.swap_remove(i);
    } else {
        edges.push((v1, v2));
    }
}

/// Turn the closest face into world-space contact data
///
/// The origin's projection onto the face is expressed in barycentric
/// coordinates, which are then applied to the originating support points
/// on both shapes; the contact point is their midpoint.
fn resolve_contact(vertices: &[SupportPoint], face: &Face) -> Penetration {
    let a = vertices[face.vertices[0]];
    let b = vertices[face.vertices[1]];
    let c = vertices[face.vertices[2]];

    let projection = face.normal * face.distance;
    let (u, v, w) = barycentric(projection, a.w, b.w, c.w);

    let on_a = a.on_a * u + b.on_a * v + c.on_a * w;
    let on_b = a.on_b * u + b.on_b * v + c.on_b * w;

    Penetration {
        normal: face.normal,
        depth: face.distance.max(0.0),
        point: (on_a + on_b) * 0.5,
    }
}

/// Barycentric coordinates of `p` with respect to triangle `(a, b, c)`
fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (f32, f32, f32) {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < EPSILON {
        return (1.0, 0.0, 0.0);
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    (1.0 - v - w, v, w)
}
