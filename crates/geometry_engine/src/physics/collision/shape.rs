//! Convex collision shapes and their support functions
//!
//! A support function maps a direction to the farthest point of a convex
//! shape along that direction; it is the only operation the GJK/EPA engine
//! needs to know about a shape. Shapes are stored in model space and
//! evaluated under a caller-supplied rigid transform: the direction is
//! rotated into local space, the local support is taken, and the point is
//! mapped back to world space.
//!
//! Rounded shapes (sphere, capsule) are split into a "core" (point,
//! segment) plus a rounding radius; the GJK distance runs on cores and the
//! radii are resolved afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::{Iso, Vec3};
use crate::geometry::AABB;

const EPSILON: f32 = 0.000001;

/// Error constructing a collision shape
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    /// Convex hulls need at least one vertex to have a support point
    #[error("convex hull requires at least one vertex")]
    EmptyHull,
    /// A radius, half-extent or half-height was negative
    #[error("shape dimension '{0}' must be non-negative")]
    NegativeDimension(&'static str),
}

/// Convex collision shape (stored in model space)
///
/// Capsules, cylinders and cones are aligned with the local Y axis. The
/// `Segment` variant is the degenerate ray-like shape whose support is
/// always one of its two endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConvexShape {
    /// Sphere around the local origin
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// Box around the local origin
    Box {
        /// Half-widths along each local axis
        half_extents: Vec3,
    },
    /// Convex hull of an arbitrary vertex list
    Hull {
        /// Hull vertices in model space (assumed convex)
        vertices: Vec<Vec3>,
    },
    /// Capsule along the local Y axis
    Capsule {
        /// Half the distance between the two cap centers
        half_height: f32,
        /// Cap radius
        radius: f32,
    },
    /// Cylinder along the local Y axis
    Cylinder {
        /// Half the cylinder height
        half_height: f32,
        /// Cylinder radius
        radius: f32,
    },
    /// Cone along the local Y axis, apex at +Y
    Cone {
        /// Half the cone height
        half_height: f32,
        /// Base radius
        radius: f32,
    },
    /// Line segment between two model-space points
    Segment {
        /// First endpoint
        start: Vec3,
        /// Second endpoint
        end: Vec3,
    },
}

impl ConvexShape {
    /// Create a sphere shape
    pub fn sphere(radius: f32) -> Result<Self, ShapeError> {
        if radius < 0.0 {
            return Err(ShapeError::NegativeDimension("radius"));
        }
        Ok(Self::Sphere { radius })
    }

    /// Create a box shape from half-extents
    pub fn cuboid(half_extents: Vec3) -> Result<Self, ShapeError> {
        if half_extents.x < 0.0 || half_extents.y < 0.0 || half_extents.z < 0.0 {
            return Err(ShapeError::NegativeDimension("half_extents"));
        }
        Ok(Self::Box { half_extents })
    }

    /// Create a convex hull shape from a vertex list
    pub fn hull(vertices: Vec<Vec3>) -> Result<Self, ShapeError> {
        if vertices.is_empty() {
            return Err(ShapeError::EmptyHull);
        }
        Ok(Self::Hull { vertices })
    }

    /// Create a Y-aligned capsule shape
    pub fn capsule(half_height: f32, radius: f32) -> Result<Self, ShapeError> {
        if half_height < 0.0 {
            return Err(ShapeError::NegativeDimension("half_height"));
        }
        if radius < 0.0 {
            return Err(ShapeError::NegativeDimension("radius"));
        }
        Ok(Self::Capsule {
            half_height,
            radius,
        })
    }

    /// Create a Y-aligned cylinder shape
    pub fn cylinder(half_height: f32, radius: f32) -> Result<Self, ShapeError> {
        if half_height < 0.0 {
            return Err(ShapeError::NegativeDimension("half_height"));
        }
        if radius < 0.0 {
            return Err(ShapeError::NegativeDimension("radius"));
        }
        Ok(Self::Cylinder {
            half_height,
            radius,
        })
    }

    /// Create a Y-aligned cone shape with apex at +Y
    pub fn cone(half_height: f32, radius: f32) -> Result<Self, ShapeError> {
        if half_height < 0.0 {
            return Err(ShapeError::NegativeDimension("half_height"));
        }
        if radius < 0.0 {
            return Err(ShapeError::NegativeDimension("radius"));
        }
        Ok(Self::Cone {
            half_height,
            radius,
        })
    }

    /// Create a segment shape
    pub fn segment(start: Vec3, end: Vec3) -> Self {
        Self::Segment { start, end }
    }

    /// Box shape plus placement transform equivalent to an AABB
    pub fn from_aabb(aabb: &AABB) -> (Self, Iso) {
        let shape = Self::Box {
            half_extents: aabb.extents(),
        };
        (shape, Iso::translation(aabb.center().x, aabb.center().y, aabb.center().z))
    }

    /// Short name of the shape kind, for logs and errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Box { .. } => "box",
            Self::Hull { .. } => "hull",
            Self::Capsule { .. } => "capsule",
            Self::Cylinder { .. } => "cylinder",
            Self::Cone { .. } => "cone",
            Self::Segment { .. } => "segment",
        }
    }

    /// Rounding radius of the shape
    ///
    /// Non-zero for sphere and capsule, whose GJK core is the center point
    /// and axis segment respectively.
    pub fn radius(&self) -> f32 {
        match self {
            Self::Sphere { radius } | Self::Capsule { radius, .. } => *radius,
            _ => 0.0,
        }
    }

    /// Farthest core point in a model-space direction
    ///
    /// The direction does not need to be normalized.
    pub fn local_support(&self, direction: &Vec3) -> Vec3 {
        match self {
            // The sphere core is its center; the radius is resolved later
            Self::Sphere { .. } => Vec3::zeros(),

            Self::Box { half_extents } => Vec3::new(
                half_extents.x.copysign(direction.x),
                half_extents.y.copysign(direction.y),
                half_extents.z.copysign(direction.z),
            ),

            Self::Hull { vertices } => {
                let mut best = vertices[0];
                let mut best_dot = best.dot(direction);
                for vertex in &vertices[1..] {
                    let dot = vertex.dot(direction);
                    if dot > best_dot {
                        best_dot = dot;
                        best = *vertex;
                    }
                }
                best
            }

            // The capsule core is its axis segment
            Self::Capsule { half_height, .. } => {
                Vec3::new(0.0, half_height.copysign(direction.y), 0.0)
            }

            Self::Cylinder {
                half_height,
                radius,
            } => {
                let radial = Vec3::new(direction.x, 0.0, direction.z);
                let radial_norm = radial.norm();
                let (x, z) = if radial_norm > EPSILON {
                    (
                        radial.x / radial_norm * radius,
                        radial.z / radial_norm * radius,
                    )
                } else {
                    (*radius, 0.0)
                };
                Vec3::new(x, half_height.copysign(direction.y), z)
            }

            Self::Cone {
                half_height,
                radius,
            } => {
                let apex = Vec3::new(0.0, *half_height, 0.0);

                let radial = Vec3::new(direction.x, 0.0, direction.z);
                let radial_norm = radial.norm();
                let rim = if radial_norm > EPSILON {
                    Vec3::new(
                        radial.x / radial_norm * radius,
                        -half_height,
                        radial.z / radial_norm * radius,
                    )
                } else {
                    Vec3::new(*radius, -half_height, 0.0)
                };

                if apex.dot(direction) >= rim.dot(direction) {
                    apex
                } else {
                    rim
                }
            }

            Self::Segment { start, end } => {
                if start.dot(direction) >= end.dot(direction) {
                    *start
                } else {
                    *end
                }
            }
        }
    }

    /// Farthest core point in a world-space direction under a rigid transform
    pub fn support(&self, iso: &Iso, direction: &Vec3) -> Vec3 {
        let local_dir = iso.rotation.inverse() * direction;
        let local = self.local_support(&local_dir);
        iso.rotation * local + iso.translation.vector
    }

    /// Farthest surface point including the rounding radius
    ///
    /// Used by EPA, where the polytope must expand to the true surface.
    pub fn rounded_support(&self, iso: &Iso, direction: &Vec3) -> Vec3 {
        let core = self.support(iso, direction);
        let radius = self.radius();
        if radius == 0.0 {
            return core;
        }

        let norm = direction.norm();
        if norm < EPSILON {
            return core;
        }
        core + direction * (radius / norm)
    }

    /// World-space center of the shape, used to seed search directions
    pub fn center(&self, iso: &Iso) -> Vec3 {
        let local = match self {
            Self::Segment { start, end } => (start + end) * 0.5,
            Self::Hull { vertices } => {
                let sum: Vec3 = vertices.iter().sum();
                sum / vertices.len() as f32
            }
            _ => Vec3::zeros(),
        };
        iso.rotation * local + iso.translation.vector
    }
}
