//! Bounding sphere
//!
//! Center/radius volume used for the cheapest broad-phase rejection tests
//! and as the bounding proxy stored in the spatial index.

use serde::{Deserialize, Serialize};

use super::{Containment, Frustum, OrientedBox, Plane, PlaneSide, Ray, AABB};
use crate::foundation::math::{Transform, Vec3};

/// Enlargement applied when building a sphere from two boundary points, so
/// floating-point rounding at the surface never produces a false negative.
const ENCLOSE_EPSILON: f32 = 0.0001;

/// A bounding sphere for spatial queries
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        debug_assert!(radius >= 0.0, "sphere radius must be non-negative");
        Self { center, radius }
    }

    /// Creates the smallest sphere through two points, slightly enlarged
    ///
    /// Center is the midpoint and radius half the distance between the
    /// points, plus a small epsilon so both points stay inside under
    /// floating-point rounding.
    pub fn from_two_points(a: Vec3, b: Vec3) -> Self {
        Self {
            center: (a + b) * 0.5,
            radius: (b - a).norm() * 0.5 + ENCLOSE_EPSILON,
        }
    }

    /// Classify a point against this sphere
    ///
    /// Strict comparison of squared distances; a point exactly on the
    /// surface is `Intersects`.
    pub fn contains_point(&self, point: Vec3) -> Containment {
        let distance_sq = (point - self.center).norm_squared();
        let radius_sq = self.radius * self.radius;

        if distance_sq > radius_sq {
            Containment::Disjoint
        } else if distance_sq < radius_sq {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Classify another sphere against this one
    pub fn contains_sphere(&self, other: &Sphere) -> Containment {
        let distance = (other.center - self.center).norm();

        if distance > self.radius + other.radius {
            Containment::Disjoint
        } else if distance + other.radius < self.radius {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Classify an AABB against this sphere
    ///
    /// `Contains` when all eight box corners are within the sphere.
    pub fn contains_aabb(&self, aabb: &AABB) -> Containment {
        if !self.intersects_aabb(aabb) {
            return Containment::Disjoint;
        }

        let radius_sq = self.radius * self.radius;
        let all_inside = aabb
            .corners()
            .iter()
            .all(|corner| (corner - self.center).norm_squared() <= radius_sq);

        if all_inside {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Classify an oriented box against this sphere
    pub fn contains_obb(&self, obb: &OrientedBox) -> Containment {
        if !self.intersects_obb(obb) {
            return Containment::Disjoint;
        }

        let radius_sq = self.radius * self.radius;
        let all_inside = obb
            .corners()
            .iter()
            .all(|corner| (corner - self.center).norm_squared() <= radius_sq);

        if all_inside {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// Classify a frustum against this sphere by its corners
    pub fn contains_frustum(&self, frustum: &Frustum) -> Containment {
        let radius_sq = self.radius * self.radius;
        let inside = frustum
            .corners()
            .iter()
            .filter(|corner| (*corner - self.center).norm_squared() <= radius_sq)
            .count();

        if inside == 8 {
            Containment::Contains
        } else if inside > 0 || frustum.intersects_sphere(self) {
            Containment::Intersects
        } else {
            Containment::Disjoint
        }
    }

    /// Fast boolean overlap test against another sphere
    pub fn intersects_sphere(&self, other: &Sphere) -> bool {
        let distance_sq = (other.center - self.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_sq <= radius_sum * radius_sum
    }

    /// Fast boolean overlap test against an AABB
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        aabb.intersects_sphere(self)
    }

    /// Fast boolean overlap test against an oriented box
    pub fn intersects_obb(&self, obb: &OrientedBox) -> bool {
        obb.intersects_sphere(self)
    }

    /// Fast boolean overlap test against a frustum
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum.intersects_sphere(self)
    }

    /// Penetration depth against another sphere (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &Sphere) -> f32 {
        let distance = (self.center - other.center).norm();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }

    /// Which side of a plane this sphere lies on
    pub fn side_of_plane(&self, plane: &Plane) -> PlaneSide {
        plane.classify_sphere(self)
    }

    /// Ray intersection; returns the entry distance if hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        ray.intersect_sphere(self)
    }

    /// Apply a transform, producing a new sphere
    ///
    /// The center moves with the transform; under non-uniform scale the
    /// radius grows by the largest scale factor so the result still
    /// encloses the original volume.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let center = transform.transform_point(self.center.into());
        let max_scale = transform
            .scale
            .x
            .abs()
            .max(transform.scale.y.abs())
            .max(transform.scale.z.abs());

        Self {
            center: center.coords,
            radius: self.radius * max_scale,
        }
    }
}
