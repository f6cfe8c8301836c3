//! # Geometry Engine
//!
//! Computational geometry and collision detection core for a real-time 3D
//! engine.
//!
//! ## Features
//!
//! - **Bounding Volumes**: AABB, oriented box, sphere and frustum with a
//!   uniform Contains/Intersects classification vocabulary
//! - **Plane and Ray Primitives**: half-space classification, slab tests,
//!   picking queries
//! - **GJK/EPA Narrow Phase**: one generic distance and contact engine for
//!   any convex shape pair, built on support functions
//! - **Spatial Partitioning**: octree broad phase over the bounding volumes
//! - **Debug Drawing**: wireframe line generation from volume corners
//!
//! ## Quick Start
//!
//! ```rust
//! use geometry_engine::prelude::*;
//!
//! // Broad phase: cull against a frustum or test boxes directly
//! let a = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
//! let b = AABB::from_center_extents(Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.25, 0.25, 0.25));
//! assert_eq!(a.contains_aabb(&b), Containment::Contains);
//!
//! // Narrow phase: contact between convex shapes under rigid transforms
//! let sphere = ConvexShape::sphere(1.0).unwrap();
//! let contact = collision::contact(
//!     &sphere,
//!     &Iso::translation(0.0, 0.0, 0.0),
//!     &sphere,
//!     &Iso::translation(0.0, 0.0, 1.5),
//! )
//! .expect("overlapping");
//! assert!((contact.depth - 0.5).abs() < 1e-3);
//! ```
//!
//! Every query in this crate is a pure function of its inputs with no
//! shared mutable state; concurrent callers need no coordination.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod debug;
pub mod foundation;
pub mod geometry;
pub mod physics;
pub mod spatial;

pub use physics::collision;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        collision::{
            self, ClosestPoints, CollisionError, ContactInfo, ConvexShape, GjkConfig, ShapeError,
        },
        foundation::math::{Iso, Mat4, Mat4Ext, Point3, Quat, Transform, Vec3},
        geometry::{
            Containment, Frustum, OrientedBox, Plane, PlaneSide, QueryPrecision, Ray, Sphere, AABB,
        },
        spatial::{Octree, OctreeConfig},
    };
}
