//! Narrow-phase collision detection for convex shapes
//!
//! One generic GJK/EPA engine handles every shape pair through the support
//! function abstraction; there is no per-pair special-case code.
//!
//! # Architecture
//!
//! - **Model Space Storage**: shapes are stored in local coordinates and
//!   evaluated under a caller-supplied rigid transform per query
//! - **Support Functions**: the engine only ever asks a shape for its
//!   farthest point along a direction
//! - **Rounded Cores**: spheres and capsules run GJK on their point or
//!   segment core and resolve the rounding radius afterwards
//!
//! # Module Organization
//!
//! - [`shape`] - Convex shapes and their support functions
//! - [`gjk`] - Distance/intersection engine and the working simplex
//! - [`epa`] - Penetration extraction for overlapping shapes
//! - [`bridge`] - Translation to the parry3d convex-collision library
//!
//! # Key Types
//!
//! - [`ConvexShape`] - Model-space convex shape
//! - [`ContactInfo`] - Unified contact result (normal, depth, point)
//! - [`ClosestPoints`] - Closest-points query result
//!
//! Every query is a pure, self-contained computation over its inputs; no
//! global state is touched and independent queries may run on separate
//! threads without coordination.

pub mod bridge;
mod contact;
pub mod epa;
pub mod gjk;
pub mod shape;

// Re-export commonly used types
pub use bridge::CollisionError;
pub use contact::{ClosestPoints, ContactInfo};
pub use gjk::{GjkConfig, GjkResult, Simplex};
pub use shape::{ConvexShape, ShapeError};

use crate::foundation::math::Iso;

const EPSILON: f32 = 0.000001;

/// Whether two shapes overlap or touch
pub fn intersects(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
) -> bool {
    intersects_with_config(shape_a, iso_a, shape_b, iso_b, &GjkConfig::default())
}

/// Whether two shapes overlap or touch, with explicit GJK tuning
pub fn intersects_with_config(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    config: &GjkConfig,
) -> bool {
    let core = gjk::closest_points(shape_a, iso_a, shape_b, iso_b, config);
    core.hit || core.distance <= shape_a.radius() + shape_b.radius()
}

/// Closest points between two shapes
pub fn closest_points(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
) -> ClosestPoints {
    closest_points_with_config(shape_a, iso_a, shape_b, iso_b, &GjkConfig::default())
}

/// Closest points between two shapes, with explicit GJK tuning
pub fn closest_points_with_config(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    config: &GjkConfig,
) -> ClosestPoints {
    let core = gjk::closest_points(shape_a, iso_a, shape_b, iso_b, config);
    if core.hit {
        return ClosestPoints::Intersecting;
    }

    let rounded = gjk::resolve_radii(&core, shape_a.radius(), shape_b.radius());
    if rounded.hit {
        ClosestPoints::Intersecting
    } else {
        ClosestPoints::Separated {
            point_a: rounded.point_a,
            point_b: rounded.point_b,
            distance: rounded.distance,
        }
    }
}

/// Contact between two overlapping shapes; `None` when separated
pub fn contact(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
) -> Option<ContactInfo> {
    contact_with_config(shape_a, iso_a, shape_b, iso_b, &GjkConfig::default())
}

/// Contact between two overlapping shapes, with explicit GJK tuning
///
/// When the shape cores overlap the contact comes from EPA; when only the
/// rounding radii overlap, the closest core points are pushed to the
/// surfaces along the separating normal and the contact sits at their
/// midpoint.
pub fn contact_with_config(
    shape_a: &ConvexShape,
    iso_a: &Iso,
    shape_b: &ConvexShape,
    iso_b: &Iso,
    config: &GjkConfig,
) -> Option<ContactInfo> {
    let core = gjk::closest_points(shape_a, iso_a, shape_b, iso_b, config);

    if core.hit {
        return epa::penetration(shape_a, iso_a, shape_b, iso_b, &core.simplex).map(|p| {
            ContactInfo {
                normal: p.normal,
                depth: p.depth,
                point: p.point,
            }
        });
    }

    let radius_a = shape_a.radius();
    let radius_b = shape_b.radius();
    let total = radius_a + radius_b;
    if core.distance > total {
        return None;
    }

    let offset = core.point_b - core.point_a;
    let norm = offset.norm();
    if norm < EPSILON {
        // Cores touch without enclosing the origin; let EPA expand from
        // the degenerate simplex over the rounded surfaces
        return epa::penetration(shape_a, iso_a, shape_b, iso_b, &core.simplex).map(|p| {
            ContactInfo {
                normal: p.normal,
                depth: p.depth,
                point: p.point,
            }
        });
    }
    let normal = offset / norm;

    let surface_a = core.point_a + normal * radius_a;
    let surface_b = core.point_b - normal * radius_b;

    Some(ContactInfo {
        normal,
        depth: total - core.distance,
        point: (surface_a + surface_b) * 0.5,
    })
}
