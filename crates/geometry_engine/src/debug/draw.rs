//! Wireframe line generation for bounding volumes
//!
//! Produces plain world-space line lists from the corner sets of the
//! bounding volumes, for a renderer's debug-draw pass to consume. No
//! render resources are touched here.

use crate::foundation::math::{constants::TAU, Vec3};
use crate::geometry::{Frustum, OrientedBox, Sphere, AABB};

/// A single debug line segment in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Line start point
    pub start: Vec3,
    /// Line end point
    pub end: Vec3,
}

/// Corner-index pairs forming the 12 edges of a box
///
/// Valid for any corner set in the shared bit ordering (bit 0 = x,
/// bit 1 = y, bit 2 = z): two corners share an edge when their indices
/// differ in exactly one bit.
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (0, 2),
    (0, 4),
    (1, 3),
    (1, 5),
    (2, 3),
    (2, 6),
    (3, 7),
    (4, 5),
    (4, 6),
    (5, 7),
    (6, 7),
];

fn corner_edges(corners: &[Vec3; 8]) -> Vec<DebugLine> {
    BOX_EDGES
        .iter()
        .map(|&(a, b)| DebugLine {
            start: corners[a],
            end: corners[b],
        })
        .collect()
}

/// Wireframe edges of an AABB
pub fn aabb_wireframe(aabb: &AABB) -> Vec<DebugLine> {
    corner_edges(&aabb.corners())
}

/// Wireframe edges of an oriented box
pub fn oriented_box_wireframe(obb: &OrientedBox) -> Vec<DebugLine> {
    corner_edges(&obb.corners())
}

/// Wireframe edges of a frustum
pub fn frustum_wireframe(frustum: &Frustum) -> Vec<DebugLine> {
    corner_edges(frustum.corners())
}

/// Three great circles approximating a sphere
///
/// `segments` is the number of line segments per circle; 16 to 32 reads
/// well at typical scene scales.
pub fn sphere_wireframe(sphere: &Sphere, segments: usize) -> Vec<DebugLine> {
    let mut lines = Vec::with_capacity(segments * 3);
    let step = TAU / segments as f32;

    for i in 0..segments {
        let a0 = i as f32 * step;
        let a1 = (i + 1) as f32 * step;
        let (sin0, cos0) = a0.sin_cos();
        let (sin1, cos1) = a1.sin_cos();
        let r = sphere.radius;
        let c = sphere.center;

        // XY, XZ and YZ circles
        lines.push(DebugLine {
            start: c + Vec3::new(cos0 * r, sin0 * r, 0.0),
            end: c + Vec3::new(cos1 * r, sin1 * r, 0.0),
        });
        lines.push(DebugLine {
            start: c + Vec3::new(cos0 * r, 0.0, sin0 * r),
            end: c + Vec3::new(cos1 * r, 0.0, sin1 * r),
        });
        lines.push(DebugLine {
            start: c + Vec3::new(0.0, cos0 * r, sin0 * r),
            end: c + Vec3::new(0.0, cos1 * r, sin1 * r),
        });
    }

    lines
}
